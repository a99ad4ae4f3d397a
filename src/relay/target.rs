//! `Target-URL` extraction and outbound URL construction.

use axum::http::HeaderMap;
use url::form_urlencoded;
use url::Url;

use super::policy::TARGET_URL;
use crate::error::RelayError;

/// Stand-in for an absent `Target-URL` on the GET path. The resulting
/// `undefined?...` string never parses as an absolute URL, so the request
/// fails inside the GET error boundary.
pub const MISSING_TARGET: &str = "undefined";

/// Read `Target-URL`. Repeated values are joined with `", "`; an empty
/// result counts as absent.
#[must_use]
pub fn target_url(headers: &HeaderMap) -> Option<String> {
    let joined = headers
        .get_all(TARGET_URL)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Build the GET outbound URL: target, a literal `?`, then the caller's
/// query re-serialized as `application/x-www-form-urlencoded`.
///
/// The `?` is always present, even with an empty query.
#[must_use]
pub fn get_target(target: Option<&str>, query: Option<&str>) -> String {
    let params = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form_urlencoded::parse(query.unwrap_or("").as_bytes()))
        .finish();
    format!("{}?{params}", target.unwrap_or(MISSING_TARGET))
}

/// Parse an outbound target the way a browser `fetch` would.
///
/// Only `http` and `https` are accepted. The fragment never goes on the wire.
pub fn parse_target(target: &str) -> Result<Url, RelayError> {
    let mut url = Url::parse(target).map_err(|source| RelayError::InvalidTarget {
        target: target.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(RelayError::UnsupportedScheme {
                target: target.to_string(),
                scheme: scheme.to_string(),
            })
        }
    }

    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn target_header_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Target-URL", HeaderValue::from_static("https://a.example"));
        assert_eq!(target_url(&headers).as_deref(), Some("https://a.example"));
    }

    #[test]
    fn empty_target_header_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert("target-url", HeaderValue::from_static(""));
        assert!(target_url(&headers).is_none());
        assert!(target_url(&HeaderMap::new()).is_none());
    }

    #[test]
    fn repeated_target_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("target-url", HeaderValue::from_static("https://a.example"));
        headers.append("Target-URL", HeaderValue::from_static("https://b.example"));
        assert_eq!(
            target_url(&headers).as_deref(),
            Some("https://a.example, https://b.example")
        );
    }

    #[test]
    fn get_target_appends_query() {
        assert_eq!(
            get_target(Some("https://api.example.com/search"), Some("q=foo")),
            "https://api.example.com/search?q=foo"
        );
    }

    #[test]
    fn get_target_keeps_trailing_question_mark() {
        assert_eq!(
            get_target(Some("https://api.example.com/items"), None),
            "https://api.example.com/items?"
        );
        assert_eq!(
            get_target(Some("https://api.example.com/items"), Some("")),
            "https://api.example.com/items?"
        );
    }

    #[test]
    fn get_target_reserializes_query() {
        assert_eq!(
            get_target(Some("http://h"), Some("q=a%20b&flag&x=%2F")),
            "http://h?q=a+b&flag=&x=%2F"
        );
    }

    #[test]
    fn missing_target_becomes_undefined() {
        assert_eq!(get_target(None, Some("q=foo")), "undefined?q=foo");
        assert!(matches!(
            parse_target(&get_target(None, Some("q=foo"))),
            Err(RelayError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn parse_target_rejects_other_schemes() {
        assert!(matches!(
            parse_target("ftp://files.example.com/a"),
            Err(RelayError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn parse_target_drops_fragment() {
        let url = parse_target("https://api.example.com/v1?x=1#frag").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1?x=1");
    }
}
