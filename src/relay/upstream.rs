//! Outbound side of the relay: the [`Upstream`] seam and its hyper client.
//!
//! [`HyperUpstream`] sends a request over the pooled hyper client, follows
//! redirects the way a browser `fetch` in "follow" mode does, collects the
//! final response body, and reports every transport problem as a
//! [`RelayError`]. No retries. The configured timeout covers the whole
//! redirect chain; without one the client's own behavior applies.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::header::{
    AUTHORIZATION, CONTENT_ENCODING, CONTENT_LANGUAGE, CONTENT_LOCATION, CONTENT_TYPE, LOCATION,
};
use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use url::Url;

use crate::error::RelayError;
use crate::server::HttpClient;

/// Redirects followed before the chain is abandoned.
pub const MAX_REDIRECTS: usize = 20;

#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Response body as text. Invalid UTF-8 is replaced, not rejected.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// async_trait is required here because Upstream is held as Arc<dyn Upstream>
// and native async fn in traits does not support dyn dispatch.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, RelayError>;
}

pub struct HyperUpstream {
    client: HttpClient,
    timeout: Option<Duration>,
}

impl HyperUpstream {
    #[must_use]
    pub const fn new(client: HttpClient, timeout: Option<Duration>) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Upstream for HyperUpstream {
    #[allow(clippy::cast_possible_truncation)]
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, RelayError> {
        let exchange = self.follow(request);
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, exchange).await.map_err(|_| {
                RelayError::UpstreamTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                }
            })?,
            None => exchange.await,
        }
    }
}

impl HyperUpstream {
    async fn follow(&self, mut request: OutboundRequest) -> Result<UpstreamResponse, RelayError> {
        let mut hops = 0;
        loop {
            let response = self.send_once(&request).await?;
            let Some(next) = redirect(&request, &response)? else {
                return Ok(response);
            };
            if hops == MAX_REDIRECTS {
                return Err(RelayError::TooManyRedirects {
                    max: MAX_REDIRECTS,
                });
            }
            hops += 1;
            tracing::debug!(
                status = response.status.as_u16(),
                from = %request.url,
                to = %next.url,
                "following upstream redirect"
            );
            request = next;
        }
    }

    async fn send_once(&self, request: &OutboundRequest) -> Result<UpstreamResponse, RelayError> {
        let uri: hyper::Uri = request.url.as_str().parse().map_err(
            |e: http::uri::InvalidUri| RelayError::UriParse {
                source: Box::new(e),
            },
        )?;

        let mut req_builder = hyper::Request::builder()
            .method(request.method.clone())
            .uri(uri);
        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }
        let req = req_builder
            .body(Full::new(request.body.clone()))
            .map_err(|e| RelayError::Upstream {
                source: Box::new(e),
            })?;

        let response = self
            .client
            .request(req)
            .await
            .map_err(|e| RelayError::Upstream {
                source: Box::new(e),
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| RelayError::UpstreamBody {
                source: Box::new(e),
            })?
            .to_bytes();

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// The request to issue next when `response` redirects, or `None` when it is
/// final. A redirect status without `Location` is final.
///
/// 303, and 301/302 after a POST, turn into a body-less GET that also drops
/// the body's headers. `Authorization` is dropped when the origin changes.
pub fn redirect(
    request: &OutboundRequest,
    response: &UpstreamResponse,
) -> Result<Option<OutboundRequest>, RelayError> {
    if !matches!(response.status.as_u16(), 301 | 302 | 303 | 307 | 308) {
        return Ok(None);
    }
    let Some(location) = response.headers.get(LOCATION) else {
        return Ok(None);
    };

    let location = String::from_utf8_lossy(location.as_bytes());
    let mut url = request
        .url
        .join(&location)
        .map_err(|source| RelayError::InvalidRedirect {
            location: location.to_string(),
            source,
        })?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(RelayError::UnsupportedScheme {
                target: url.to_string(),
                scheme: scheme.to_string(),
            })
        }
    }
    url.set_fragment(None);

    let mut next = OutboundRequest {
        method: request.method.clone(),
        url,
        headers: request.headers.clone(),
        body: request.body.clone(),
    };

    let to_get = match response.status.as_u16() {
        303 => request.method != Method::HEAD,
        301 | 302 => request.method == Method::POST,
        _ => false,
    };
    if to_get {
        next.method = Method::GET;
        next.body = Bytes::new();
        for name in [CONTENT_TYPE, CONTENT_ENCODING, CONTENT_LANGUAGE, CONTENT_LOCATION] {
            next.headers.remove(name);
        }
    }

    if next.url.origin() != request.url.origin() {
        next.headers.remove(AUTHORIZATION);
    }

    Ok(Some(next))
}
