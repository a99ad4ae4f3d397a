//! The forwarding relay behind the CORS endpoint.
//!
//! A caller names the upstream in the `Target-URL` header; the relay
//! re-issues the request there and hands the upstream's status and body
//! back with permissive CORS headers attached. Two entry points share one
//! forwarding routine ([`forward`]) and differ only in their
//! [`ForwardPolicy`](policy::ForwardPolicy) and in how they treat failure:
//!
//! - [`handle_post`] rejects a missing target with `400` and lets upstream
//!   transport failures propagate as `Err`.
//! - [`handle_get`] never fails: any error while building the URL or
//!   talking to the upstream becomes a `500` JSON body.
//!
//! Submodules hold the header rules ([`policy`]), target parsing
//! ([`target`]) and the outbound client seam ([`upstream`]).

pub mod policy;
pub mod target;
pub mod upstream;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::RelayError;
use crate::server::AppState;
use policy::{ForwardPolicy, ALLOW_METHODS_POST, ALLOW_ORIGIN_ANY, GET_POLICY, POST_POLICY};
use upstream::{OutboundRequest, Upstream, UpstreamResponse};

pub const MISSING_TARGET_MESSAGE: &str = "Missing Target-URL header";
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// How a relay call ended. Attached to the response as an extension so the
/// handlers can log and count without re-deriving it from the status code,
/// which may just as well be the upstream's own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Relayed,
    Rejected,
    Failed(String),
}

/// Send one request to `target` under `policy`.
pub async fn forward(
    upstream: &dyn Upstream,
    policy: &ForwardPolicy,
    target: &str,
    inbound: &HeaderMap,
    body: Bytes,
) -> Result<UpstreamResponse, RelayError> {
    let url = target::parse_target(target)?;
    upstream
        .send(OutboundRequest {
            method: policy.method.clone(),
            url,
            headers: policy.outbound_headers(inbound),
            body,
        })
        .await
}

pub async fn handle_post(
    upstream: &dyn Upstream,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    let Some(target) = target::target_url(headers) else {
        let mut response = (StatusCode::BAD_REQUEST, MISSING_TARGET_MESSAGE).into_response();
        response.extensions_mut().insert(RelayOutcome::Rejected);
        return Ok(response);
    };

    // Read as text: valid UTF-8 passes through untouched.
    let body = if std::str::from_utf8(&body).is_ok() {
        body
    } else {
        Bytes::from(String::from_utf8_lossy(&body).into_owned())
    };

    // Transport failures propagate; there is no catch on this path.
    let relayed = forward(upstream, &POST_POLICY, &target, headers, body).await?;

    let mut response = text_response(relayed.status, relayed.text());
    let (name, value) = ALLOW_ORIGIN_ANY;
    response.headers_mut().insert(name, value);
    let (name, value) = ALLOW_METHODS_POST;
    response.headers_mut().insert(name, value);
    response.extensions_mut().insert(RelayOutcome::Relayed);
    Ok(response)
}

pub async fn handle_get(upstream: &dyn Upstream, uri: &Uri, headers: &HeaderMap) -> Response {
    let target = target::get_target(target::target_url(headers).as_deref(), uri.query());

    match forward(upstream, &GET_POLICY, &target, headers, Bytes::new()).await {
        Ok(relayed) => {
            let mut response = text_response(relayed.status, relayed.text());
            let (name, value) = ALLOW_ORIGIN_ANY;
            response.headers_mut().insert(name, value);
            if let Some(content_type) = joined_content_type(&relayed.headers) {
                response.headers_mut().insert(CONTENT_TYPE, content_type);
            }
            response.extensions_mut().insert(RelayOutcome::Relayed);
            response
        }
        Err(e) => {
            let message = failure_message(&e);
            let mut response = (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response();
            response.extensions_mut().insert(RelayOutcome::Failed(message));
            response
        }
    }
}

/// The upstream `Content-Type`, repeated values joined with `", "`. Empty
/// counts as absent.
fn joined_content_type(headers: &HeaderMap) -> Option<HeaderValue> {
    let joined = headers
        .get_all(CONTENT_TYPE)
        .iter()
        .map(HeaderValue::as_bytes)
        .collect::<Vec<_>>()
        .join(&b", "[..]);
    if joined.is_empty() {
        None
    } else {
        HeaderValue::from_bytes(&joined).ok()
    }
}

/// Text carried by the GET failure body.
#[must_use]
pub fn failure_message(err: &RelayError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

// Built by hand so no Content-Type is implied by the body type.
fn text_response(status: StatusCode, text: String) -> Response {
    let mut response = Response::new(Body::from(text));
    *response.status_mut() = status;
    response
}

pub async fn relay_post(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    let request_id = uuid::Uuid::new_v4().to_string();
    let start = Instant::now();

    let result = handle_post(state.upstream.as_ref(), &headers, body).await;
    match &result {
        Ok(response) => observe(&state, &Method::POST, &request_id, addr, &headers, start, response),
        Err(e) => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                request_id = %request_id,
                method = %Method::POST,
                client = %addr,
                target = %target::target_url(&headers).unwrap_or_default(),
                error = %e,
                "relay failed"
            );
        }
    }
    result
}

pub async fn relay_get(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let start = Instant::now();

    let response = handle_get(state.upstream.as_ref(), &uri, &headers).await;
    observe(&state, &Method::GET, &request_id, addr, &headers, start, &response);
    response
}

#[allow(clippy::cast_possible_truncation)]
fn observe(
    state: &AppState,
    method: &Method,
    request_id: &str,
    client: SocketAddr,
    headers: &HeaderMap,
    start: Instant,
    response: &Response,
) {
    let latency_ms = start.elapsed().as_millis() as u64;
    let target = target::target_url(headers).unwrap_or_default();

    match response.extensions().get::<RelayOutcome>() {
        Some(RelayOutcome::Relayed) => {
            state.stats.relayed.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                request_id = %request_id,
                method = %method,
                client = %client,
                target = %target,
                status = response.status().as_u16(),
                latency_ms,
                "request relayed"
            );
        }
        Some(RelayOutcome::Rejected) => {
            state.stats.rejected.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                client = %client,
                "missing Target-URL header"
            );
        }
        Some(RelayOutcome::Failed(message)) => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                client = %client,
                target = %target,
                error = %message,
                latency_ms,
                "relay failed"
            );
        }
        None => {}
    }
}
