//! Endpoint lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled prefix routes
//! - Look up the endpoint for a request
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (two routes)
//! - The redirect is the explicit fallback, never an error

use axum::body::Body;
use axum::http::Request;

use crate::config::RoutingConfig;
use crate::routing::matcher::{Matcher, PathPrefixMatcher};

/// What a request is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Relay the copy source into the destination named by the path.
    Transload,
    /// Fixed version document.
    Version,
    /// Redirect to the project page.
    Redirect,
}

impl Endpoint {
    /// Label used in logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Transload => "transload",
            Endpoint::Version => "version",
            Endpoint::Redirect => "redirect",
        }
    }
}

/// Path-prefix dispatcher.
#[derive(Debug)]
pub struct Dispatcher {
    routes: Vec<(Box<dyn Matcher>, Endpoint)>,
}

impl Dispatcher {
    /// Compile the dispatch table from configuration.
    pub fn from_config(config: &RoutingConfig) -> Self {
        let routes: Vec<(Box<dyn Matcher>, Endpoint)> = vec![
            (
                Box::new(PathPrefixMatcher::new(config.transload_prefix.clone())),
                Endpoint::Transload,
            ),
            (
                Box::new(PathPrefixMatcher::new(config.version_prefix.clone())),
                Endpoint::Version,
            ),
        ];

        Self { routes }
    }

    /// Find the endpoint for a request.
    pub fn match_request(&self, req: &Request<Body>) -> Endpoint {
        self.routes
            .iter()
            .find(|(matcher, _)| matcher.matches(req))
            .map(|(_, endpoint)| *endpoint)
            .unwrap_or(Endpoint::Redirect)
    }
}
