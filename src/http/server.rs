//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing, timeout, panic capture)
//! - Build the outbound HTTP client shared by both relay legs
//! - Bind server to listener and drain on shutdown

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{RelayConfig, RoutingConfig, TimeoutConfig};
use crate::http::request::{request_id, MakeRequestUuid};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::{Dispatcher, Endpoint};
use crate::transload::error::handle_panic;
use crate::transload::{AzureBlobResolver, DestinationResolver, Relay, RelayRequest};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub relay: Arc<Relay>,
    pub routing: Arc<RoutingConfig>,
}

/// HTTP server for the transload relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(&config.timeouts)?;
        let resolver = Arc::new(AzureBlobResolver::from_config(
            &config.routing.transload_prefix,
            &config.destination,
        ));

        Ok(Self::with_parts(config, client, resolver))
    }

    /// Create a server around an existing client and destination resolver.
    pub fn with_parts(
        config: RelayConfig,
        client: reqwest::Client,
        resolver: Arc<dyn DestinationResolver>,
    ) -> Self {
        let state = AppState {
            dispatcher: Arc::new(Dispatcher::from_config(&config.routing)),
            relay: Arc::new(Relay::new(client, resolver)),
            routing: Arc::new(config.routing.clone()),
        };

        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(request),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Outbound client used for both the source fetch and the destination write.
pub fn build_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("gtr-relay/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
}

/// Entry handler: looks up the endpoint and serves it.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let endpoint = state.dispatcher.match_request(&request);

    tracing::debug!(endpoint = endpoint.label(), "Dispatching request");

    let response = match endpoint {
        Endpoint::Transload => transload_handler(&state, request).await,
        Endpoint::Version => response::version(&state.routing.api_version),
        Endpoint::Redirect => response::redirect(&state.routing.redirect_location),
    };

    let status = response.status().as_u16();
    metrics::record_request(endpoint.label(), status);
    if endpoint == Endpoint::Transload {
        metrics::record_transload(status, start_time);
    }

    response
}

/// Relay the request; the inbound body is discarded unread.
async fn transload_handler(state: &AppState, request: Request<Body>) -> Response {
    let (parts, _body) = request.into_parts();
    let relay_request = RelayRequest::new(parts.method, parts.uri, parts.headers);

    match state.relay.relay(relay_request).await {
        Ok(outcome) => {
            tracing::info!(status = %outcome.status, "Transload finished");
            outcome.into_response()
        }
        Err(e) => {
            if let Some(status) = e.client_status() {
                tracing::warn!(status = %status, error = %e, "Transload rejected");
            }
            e.into_response()
        }
    }
}
