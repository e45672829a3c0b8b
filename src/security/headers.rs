//! Header partitioning between the two outbound legs.
//!
//! # Responsibilities
//! - Select the inbound headers that travel to the destination write
//! - Keep edge-injected headers from leaking to the destination
//! - Strip hop-by-hop headers from relayed responses
//!
//! # Design Decisions
//! - Nothing is copied to the source leg; its only header (`Range`) is synthesized
//! - Header names are lowercase in `HeaderMap`, so prefix checks are case-insensitive
//! - Repeated inbound values collapse to the last one

use axum::http::{header, HeaderMap, HeaderName};

/// Headers with this prefix are forwarded to the destination write.
pub const DESTINATION_HEADER_PREFIX: &str = "x-ms-";

/// Headers injected by the edge platform in front of the relay.
pub const EDGE_INTERNAL_PREFIX: &str = "cf-";

/// Connection-scoped headers that never cross a proxy.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Outbound header sets, one per leg.
#[derive(Debug, Default, Clone)]
pub struct HeaderSet {
    /// Sent with the destination write.
    pub destination: HeaderMap,
    /// Sent with the source fetch.
    pub source: HeaderMap,
}

/// Split the inbound headers into destination-bound and source-bound sets.
pub fn partition(inbound: &HeaderMap) -> HeaderSet {
    let mut set = HeaderSet::default();

    for (name, value) in inbound {
        if name.as_str().starts_with(DESTINATION_HEADER_PREFIX) {
            set.destination.insert(name.clone(), value.clone());
        }
    }

    strip_internal(&mut set.destination);
    set
}

/// Remove every edge-internal header.
pub fn strip_internal(headers: &mut HeaderMap) {
    strip_prefixed(headers, EDGE_INTERNAL_PREFIX);
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

fn strip_prefixed(headers: &mut HeaderMap, prefix: &str) {
    let doomed: Vec<HeaderName> = headers
        .keys()
        .filter(|name| name.as_str().starts_with(prefix))
        .cloned()
        .collect();

    for name in doomed {
        headers.remove(name);
    }
}
