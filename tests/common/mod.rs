//! Shared harness: a recording mock upstream and a running relay.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;

use cors_relay::relay::upstream::HyperUpstream;
use cors_relay::server::{self, AppState, Stats};

pub const RELAY_PATH: &str = "/api/proxy";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone, Default)]
pub struct MockUpstream {
    pub requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Upstream with a few fixed behaviors:
/// - `/echo` answers 201 with the request body and a JSON content type
/// - `/plain` answers 200 with no content type at all
/// - `/teapot` answers 418 with a text body
/// - `/slow` waits two seconds before answering
/// - `/moved` answers 302 to `/plain`
/// - `/see-other` answers 303 to `/echo` for any method
/// - `/loop` answers 302 to itself forever, for any method
pub async fn start_upstream() -> (SocketAddr, MockUpstream) {
    let mock = MockUpstream::default();

    let record = |mock: MockUpstream| {
        move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
            let mock = mock.clone();
            async move {
                mock.requests.lock().unwrap().push(Recorded {
                    method,
                    uri,
                    headers,
                    body: body.clone(),
                });
                (
                    StatusCode::CREATED,
                    [("content-type", "application/json"), ("x-upstream", "echo")],
                    body,
                )
            }
        }
    };

    let router = Router::new()
        .route("/echo", any(record(mock.clone())))
        .route(
            "/plain",
            get(|| async {
                let mut response = Response::new(Body::from("plain text"));
                *response.status_mut() = StatusCode::OK;
                response
            }),
        )
        .route(
            "/teapot",
            get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout").into_response() }),
        )
        .route(
            "/moved",
            get(|| async { (StatusCode::FOUND, [("location", "/plain")]) }),
        )
        .route(
            "/see-other",
            any(|| async { (StatusCode::SEE_OTHER, [("location", "/echo")]) }),
        )
        .route(
            "/loop",
            any(|| async { (StatusCode::FOUND, [("location", "/loop")]) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, mock)
}

/// An address nothing listens on: bind, read the port, drop the socket.
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub struct Relay {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    pub shutdown: tokio::sync::oneshot::Sender<()>,
}

impl Relay {
    pub fn url(&self) -> String {
        format!("http://{}{RELAY_PATH}", self.addr)
    }
}

pub async fn start_relay(upstream_timeout_ms: Option<u64>) -> Relay {
    let client = server::build_http_client(Duration::from_secs(30));
    let state = Arc::new(AppState {
        upstream: Arc::new(HyperUpstream::new(
            client,
            upstream_timeout_ms.map(Duration::from_millis),
        )),
        relay_path: RELAY_PATH.into(),
        upstream_timeout_ms,
        start_time: Instant::now(),
        stats: Stats::new(),
    });

    let router = server::build_router(Arc::clone(&state), 1_048_576);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .unwrap();
    });

    Relay {
        addr,
        state,
        shutdown: shutdown_tx,
    }
}
