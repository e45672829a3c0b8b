//! Streaming relay engine.
//!
//! # Responsibilities
//! - Run the pre-flight checks (headers, range, allowlist, destination path)
//!   before any network call
//! - Fetch the source and pipe its body into the destination write
//! - Pass source failures through without touching the destination
//! - Collect the destination's acknowledgment for the caller
//!
//! # Design Decisions
//! - The source body is never buffered: it is handed to the destination
//!   request as a stream, so the destination's read rate paces the source
//! - The destination acknowledgment is small and is buffered in full
//! - Exactly one attempt per inbound request, no retries

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use futures_util::StreamExt;
use url::Url;

use crate::observability::metrics;
use crate::security::{allowlist, headers};
use crate::transload::destination::{redacted, DestinationResolver};
use crate::transload::error::RelayError;
use crate::transload::range;
use crate::transload::{COPY_SOURCE_HEADER, SOURCE_RANGE_HEADER};

/// The inbound transload request. Its body is never read.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RelayRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }
}

/// The response handed back to the caller.
#[derive(Debug)]
pub struct RelayOutcome {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

/// Relays bytes from an allowlisted source into a destination write.
#[derive(Debug, Clone)]
pub struct Relay {
    client: reqwest::Client,
    resolver: Arc<dyn DestinationResolver>,
}

impl Relay {
    pub fn new(client: reqwest::Client, resolver: Arc<dyn DestinationResolver>) -> Self {
        Self { client, resolver }
    }

    /// Run one transload.
    pub async fn relay(&self, request: RelayRequest) -> Result<RelayOutcome, RelayError> {
        // 1. Partition headers
        let mut outbound = headers::partition(&request.headers);

        // 2. Copy source present and well-formed
        let copy_source = request
            .headers
            .get(COPY_SOURCE_HEADER)
            .ok_or(RelayError::MissingCopySource)?
            .to_str()
            .map_err(|_| RelayError::InvalidCopySource("value is not visible ASCII".into()))?;

        // 3. Range
        let range = range::translate(request.headers.get(SOURCE_RANGE_HEADER))?;
        if let Some(range) = &range {
            outbound
                .destination
                .insert(header::CONTENT_LENGTH, HeaderValue::from(range.content_length));
        }

        // 4. Allowlist
        let source_url = Url::parse(copy_source)
            .map_err(|e| RelayError::InvalidCopySource(e.to_string()))?;
        if !allowlist::is_allowed(&source_url) {
            tracing::warn!(source = %source_url, "Copy source rejected by allowlist");
            metrics::record_source_rejection();
            return Err(RelayError::SourceNotAllowed);
        }

        // 5. Destination path shape
        self.resolver.check_path(&request.uri)?;

        if let Some(range) = &range {
            tracing::debug!(range = ?range.source_range, "Forwarding source range");
            outbound
                .source
                .insert(header::RANGE, range.source_range.clone());
        }

        // 6. Fetch source (headers only)
        tracing::info!(source = %source_url, "Fetching source");
        let source = self
            .client
            .get(source_url)
            .headers(outbound.source)
            .send()
            .await
            .map_err(RelayError::Source)?;

        let source_status = source.status();
        tracing::info!(status = %source_status, "Source responded");

        if !source_status.is_success() {
            return Ok(RelayOutcome {
                status: source_status,
                headers: source.headers().clone(),
                body: Body::from_stream(source.bytes_stream()),
            });
        }

        if range.is_none() {
            let length = match source.headers().get(header::CONTENT_LENGTH) {
                Some(length) => length.clone(),
                None => {
                    tracing::warn!(
                        source = %source.url(),
                        "Source sent no Content-Length; writing an empty destination body"
                    );
                    HeaderValue::from_static("0")
                }
            };
            outbound.destination.insert(header::CONTENT_LENGTH, length);
        }
        headers::strip_internal(&mut outbound.destination);

        // 7. Resolve destination
        let destination_url = self.resolver.resolve(&request.uri)?;
        tracing::info!(
            destination = %redacted(&destination_url),
            content_length = ?outbound.destination.get(header::CONTENT_LENGTH),
            "Proxying to destination"
        );

        // 8. Stream source body into the destination write
        let body = source.bytes_stream().inspect(|chunk| {
            if let Ok(chunk) = chunk {
                metrics::record_streamed_bytes(chunk.len());
            }
        });

        let response = self
            .client
            .request(request.method, destination_url)
            .headers(outbound.destination)
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await
            .map_err(RelayError::Destination)?;

        // 9. Buffer the acknowledgment
        let status = response.status();
        let ack_headers = response.headers().clone();
        let body = response.bytes().await.map_err(RelayError::Destination)?;

        tracing::info!(status = %status, body_len = body.len(), "Destination responded");
        tracing::debug!(body = %String::from_utf8_lossy(&body), "Destination response body");

        Ok(RelayOutcome {
            status,
            headers: ack_headers,
            body: Body::from(body),
        })
    }
}
