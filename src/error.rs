//! Unified error types for the relay.
//!
//! Defines [`RelayError`] (the main crate error enum) and
//! [`ValidationError`] for config validation failures. Both use
//! `thiserror` for `Display` and `Error` derives. Config error messages
//! include contextual hints to guide the user toward a fix.
//!
//! Relay failures render their whole source chain, because that text is
//! what the GET path hands back to the caller as `{"error": ...}`.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub section: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}.{}: {}", self.section, self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

/// Render an error followed by every `source()` below it, `: `-separated.
///
/// hyper's client errors are terse at the top level ("client error (Connect)")
/// and carry the useful part (refused, DNS, TLS) further down the chain.
#[must_use]
pub fn display_chain(err: &BoxError) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !text.is_empty() && !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        current = source.source();
    }
    out
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: BoxError,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: BoxError,
    },

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),

    #[error("Invalid target URL '{target}': {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported target scheme '{scheme}' in '{target}' (expected http or https)")]
    UnsupportedScheme { target: String, scheme: String },

    #[error("Upstream request failed: {}", display_chain(.source))]
    Upstream {
        #[source]
        source: BoxError,
    },

    #[error("Upstream request timed out after {timeout_ms}ms")]
    UpstreamTimeout { timeout_ms: u64 },

    #[error("Upstream redirected more than {max} times")]
    TooManyRedirects { max: usize },

    #[error("Invalid redirect location '{location}': {source}")]
    InvalidRedirect {
        location: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to read upstream response body: {}", display_chain(.source))]
    UpstreamBody {
        #[source]
        source: BoxError,
    },
}

/// An error that escapes a relay handler is the host's generic 500.
///
/// The POST path lets transport failures reach this point; the caller only
/// sees the bare status. Logging is the handler's job, where the request id
/// and target are known.
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
