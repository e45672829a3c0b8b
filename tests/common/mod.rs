//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use futures_util::stream;
use gtr_relay::config::RelayConfig;
use gtr_relay::transload::{AzureBlobResolver, DestinationError, DestinationResolver};
use gtr_relay::{HttpServer, Shutdown};
use tokio::net::TcpListener;
use url::Url;

/// Size of the file served by the mock source.
pub const SOURCE_LEN: usize = 500;

/// Deterministic file contents served by the mock source.
pub fn source_bytes() -> Vec<u8> {
    (0..SOURCE_LEN).map(|i| (i % 251) as u8).collect()
}

/// Bind an axum app on an ephemeral localhost port.
async fn spawn_app(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A request seen by a mock server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Mock origin serving `/file.iso` (honours `Range`), `/chunked.iso` (no
/// `Content-Length`) and `/truncated.iso` (dies mid-body); every other path is a 404.
#[derive(Clone, Default)]
pub struct MockSource {
    pub addr: Option<SocketAddr>,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockSource {
    pub async fn start() -> Self {
        let mut source = MockSource::default();
        let app = Router::new()
            .route("/file.iso", get(serve_file))
            .route("/chunked.iso", get(serve_chunked))
            .route("/truncated.iso", get(serve_truncated))
            .fallback(serve_missing)
            .with_state(source.requests.clone());
        source.addr = Some(spawn_app(app).await);
        source
    }

    pub fn port(&self) -> u16 {
        self.addr.unwrap().port()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> Recorded {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

fn record(requests: &Mutex<Vec<Recorded>>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) {
    requests.lock().unwrap().push(Recorded {
        method,
        uri,
        headers,
        body,
    });
}

async fn serve_file(
    State(requests): State<Arc<Mutex<Vec<Recorded>>>>,
    request: Request<Body>,
) -> Response {
    let (parts, _) = request.into_parts();
    record(&requests, parts.method, parts.uri, parts.headers.clone(), Bytes::new());

    let data = source_bytes();
    let range = parts
        .headers
        .get("range")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("bytes="))
        .and_then(|v| v.split_once('-'))
        .and_then(|(s, e)| Some((s.parse::<usize>().ok()?, e.parse::<usize>().ok()?)));

    match range {
        Some((start, end)) => (
            StatusCode::PARTIAL_CONTENT,
            [("content-range", format!("bytes {}-{}/{}", start, end, SOURCE_LEN))],
            data[start..=end].to_vec(),
        )
            .into_response(),
        None => (StatusCode::OK, data).into_response(),
    }
}

async fn serve_chunked(
    State(requests): State<Arc<Mutex<Vec<Recorded>>>>,
    request: Request<Body>,
) -> Response {
    let (parts, _) = request.into_parts();
    record(&requests, parts.method, parts.uri, parts.headers, Bytes::new());

    let chunks = stream::iter([
        Ok::<_, io::Error>(Bytes::from_static(b"hello ")),
        Ok(Bytes::from_static(b"world")),
    ]);
    (StatusCode::OK, Body::from_stream(chunks)).into_response()
}

/// Promises eleven bytes, sends five, then drops the connection.
async fn serve_truncated(
    State(requests): State<Arc<Mutex<Vec<Recorded>>>>,
    request: Request<Body>,
) -> Response {
    let (parts, _) = request.into_parts();
    record(&requests, parts.method, parts.uri, parts.headers, Bytes::new());

    let chunks = stream::iter([
        Ok(Bytes::from_static(b"hello")),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "origin went away")),
    ]);
    (
        StatusCode::OK,
        [("content-length", "11")],
        Body::from_stream(chunks),
    )
        .into_response()
}

async fn serve_missing(
    State(requests): State<Arc<Mutex<Vec<Recorded>>>>,
    request: Request<Body>,
) -> Response {
    let (parts, _) = request.into_parts();
    record(&requests, parts.method, parts.uri, parts.headers, Bytes::new());
    (
        StatusCode::NOT_FOUND,
        [("x-origin", "mock")],
        "no such object",
    )
        .into_response()
}

/// Mock blob service: records every write and acknowledges with 201.
#[derive(Clone, Default)]
pub struct MockDestination {
    pub addr: Option<SocketAddr>,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockDestination {
    pub async fn start() -> Self {
        let mut destination = MockDestination::default();
        let app = Router::new()
            .route("/{*path}", any(accept_write))
            .with_state(destination.requests.clone());
        destination.addr = Some(spawn_app(app).await);
        destination
    }

    /// Endpoint template for the relay's resolver.
    pub fn endpoint(&self) -> String {
        format!("http://{}/{{account}}", self.addr.unwrap())
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> Recorded {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

async fn accept_write(
    State(requests): State<Arc<Mutex<Vec<Recorded>>>>,
    request: Request<Body>,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
    record(&requests, parts.method, parts.uri, parts.headers, body);

    (
        StatusCode::CREATED,
        [("x-ms-request-id", "mock-request"), ("etag", "\"0x8DB0\"")],
        "<?xml version=\"1.0\"?><Ack/>",
    )
        .into_response()
}

/// Resolver wrapper that counts how often it is asked.
#[derive(Debug)]
pub struct CountingResolver {
    inner: AzureBlobResolver,
    pub calls: Arc<AtomicUsize>,
}

impl CountingResolver {
    pub fn new(inner: AzureBlobResolver) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl DestinationResolver for CountingResolver {
    fn resolve(&self, uri: &Uri) -> Result<Url, DestinationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(uri)
    }

    fn check_path(&self, uri: &Uri) -> Result<(), DestinationError> {
        self.inner.check_path(uri)
    }
}

/// A running relay wired to local mocks.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub resolver_calls: Arc<AtomicUsize>,
    shutdown: Shutdown,
}

impl TestRelay {
    /// Start a relay whose outbound client sends allowlisted hostnames to localhost.
    pub async fn start(destination: &MockDestination) -> Self {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.destination.endpoint = destination.endpoint();

        let localhost: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let client = reqwest::Client::builder()
            .no_proxy()
            .resolve("releases.ubuntu.com", localhost)
            .resolve("apidata.googleusercontent.com", localhost)
            .resolve("evil.example.com", localhost)
            .build()
            .unwrap();

        let resolver = CountingResolver::new(AzureBlobResolver::from_config(
            &config.routing.transload_prefix,
            &config.destination,
        ));
        let resolver_calls = resolver.calls.clone();

        let server = HttpServer::with_parts(config, client, Arc::new(resolver));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            addr,
            resolver_calls,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn resolver_calls(&self) -> usize {
        self.resolver_calls.load(Ordering::SeqCst)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Client for talking to the relay itself.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
