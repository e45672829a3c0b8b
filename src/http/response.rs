//! Response construction.
//!
//! # Responsibilities
//! - Turn a relay outcome into the caller's response
//! - Strip hop-by-hop headers from relayed responses
//! - Build the version and redirect responses
//!
//! # Design Decisions
//! - Status, end-to-end headers and body of the relayed leg pass through verbatim
//! - Streaming bodies stay streaming

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::security::headers::strip_hop_by_hop;
use crate::transload::RelayOutcome;

impl IntoResponse for RelayOutcome {
    fn into_response(self) -> Response {
        let RelayOutcome {
            status,
            mut headers,
            body,
        } = self;
        strip_hop_by_hop(&mut headers);

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionInfo<'a> {
    api_version: &'a str,
}

/// The version document, pretty-printed JSON.
pub fn version(api_version: &str) -> Response {
    match serde_json::to_string_pretty(&VersionInfo { api_version }) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize version info");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `302 Found` to the project page.
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
