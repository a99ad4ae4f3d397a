//! Per-verb header forwarding rules and the CORS headers the relay attaches.
//!
//! The two verbs forward different caller headers on purpose: POST sends
//! a fixed `Content-Type: application/json` and the caller's
//! `Authorization`; GET sends the caller's `Content-Type` and nothing else.
//! Each rule set is a [`ForwardPolicy`] constant consumed by the one
//! shared [`ForwardPolicy::outbound_headers`] routine.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Header naming the upstream endpoint. Lookups are case-insensitive.
pub const TARGET_URL: HeaderName = HeaderName::from_static("target-url");

pub const ALLOW_ORIGIN_ANY: (HeaderName, HeaderValue) =
    (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

pub const ALLOW_METHODS_POST: (HeaderName, HeaderValue) =
    (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST"));

#[derive(Debug, Clone)]
pub struct ForwardPolicy {
    pub method: Method,
    pub forward_authorization: bool,
    pub forward_content_type: bool,
    pub fixed_content_type: Option<&'static str>,
}

pub const POST_POLICY: ForwardPolicy = ForwardPolicy {
    method: Method::POST,
    forward_authorization: true,
    forward_content_type: false,
    fixed_content_type: Some("application/json"),
};

pub const GET_POLICY: ForwardPolicy = ForwardPolicy {
    method: Method::GET,
    forward_authorization: false,
    forward_content_type: true,
    fixed_content_type: None,
};

impl ForwardPolicy {
    /// Build the outbound header set from the caller's headers.
    ///
    /// Nothing outside the policy is copied. A forwarded header whose values
    /// are all empty counts as absent.
    #[must_use]
    pub fn outbound_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(content_type) = self.fixed_content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        } else if self.forward_content_type {
            copy_verbatim(inbound, &mut headers, &CONTENT_TYPE);
        }

        if self.forward_authorization {
            copy_verbatim(inbound, &mut headers, &AUTHORIZATION);
        }

        headers
    }
}

fn copy_verbatim(from: &HeaderMap, to: &mut HeaderMap, name: &HeaderName) {
    for value in from.get_all(name) {
        if !value.is_empty() {
            to.append(name.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(*name, HeaderValue::from_static(*value));
        }
        headers
    }

    #[test]
    fn post_forces_json_and_drops_caller_content_type() {
        let headers = POST_POLICY.outbound_headers(&inbound(&[("content-type", "text/plain")]));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn post_forwards_authorization_verbatim() {
        let headers = POST_POLICY.outbound_headers(&inbound(&[
            ("authorization", "Bearer tok"),
            ("cookie", "session=1"),
            ("target-url", "https://api.example.com"),
        ]));
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert!(headers.get("cookie").is_none());
        assert!(headers.get(TARGET_URL).is_none());
    }

    #[test]
    fn post_omits_empty_authorization() {
        let headers = POST_POLICY.outbound_headers(&inbound(&[("authorization", "")]));
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn get_forwards_content_type_but_not_authorization() {
        let headers = GET_POLICY.outbound_headers(&inbound(&[
            ("content-type", "application/xml"),
            ("authorization", "Bearer tok"),
        ]));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/xml");
    }

    #[test]
    fn get_sends_nothing_without_caller_content_type() {
        let headers = GET_POLICY.outbound_headers(&inbound(&[("accept", "*/*")]));
        assert!(headers.is_empty());
    }
}
