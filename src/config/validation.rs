//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for values the
//! server cannot start with: a non-IP listen host, port `0`, a zero body
//! limit, a relay path that is not a plain absolute route or collides
//! with `/health`, and zero timeouts. Returns a list of
//! [`ValidationError`] values with per-field suggestions.

use std::net::IpAddr;

use super::model::Config;
use crate::error::ValidationError;

/// Axum route syntax that must not appear in a literal relay path.
const ROUTE_SYNTAX: &[char] = &[':', '*', '{', '}'];

/// Validate the relay path. Returns `Ok(())` or a human-readable error.
pub fn validate_relay_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("path cannot be empty".into());
    }
    if !path.starts_with('/') {
        return Err(format!("path must start with '/' (did you mean '/{path}'?)"));
    }
    if path == "/health" {
        return Err("path '/health' is reserved for the health endpoint".into());
    }
    if let Some(c) = path.chars().find(|c| ROUTE_SYNTAX.contains(c)) {
        return Err(format!("path cannot contain route syntax '{c}'"));
    }
    if path.contains('?') || path.contains('#') {
        return Err("path cannot contain a query or fragment".into());
    }
    Ok(())
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError {
            section: "server".into(),
            field: "host".into(),
            message: format!("'{}' is not an IP address", config.server.host),
            suggestion: if config.server.host == "localhost" {
                Some("use '127.0.0.1'".into())
            } else {
                Some("use '0.0.0.0' to listen on all interfaces".into())
            },
        });
    }

    if config.server.port == 0 {
        errors.push(ValidationError {
            section: "server".into(),
            field: "port".into(),
            message: "port must be between 1 and 65535".into(),
            suggestion: None,
        });
    }

    if config.server.max_body == 0 {
        errors.push(ValidationError {
            section: "server".into(),
            field: "max_body".into(),
            message: "max_body must be greater than 0".into(),
            suggestion: Some("the default is 1048576 (1 MiB)".into()),
        });
    }

    if let Err(msg) = validate_relay_path(&config.relay.path) {
        let path = &config.relay.path;
        errors.push(ValidationError {
            section: "relay".into(),
            field: "path".into(),
            message: msg,
            suggestion: if !path.is_empty() && !path.starts_with('/') {
                Some(format!("did you mean '/{path}'?"))
            } else {
                None
            },
        });
    }

    if config.relay.upstream_timeout == Some(0) {
        errors.push(ValidationError {
            section: "relay".into(),
            field: "upstream_timeout".into(),
            message: "upstream_timeout must be greater than 0".into(),
            suggestion: Some("remove the field to disable the timeout".into()),
        });
    }

    if config.relay.pool_idle_timeout == 0 {
        errors.push(ValidationError {
            section: "relay".into(),
            field: "pool_idle_timeout".into(),
            message: "pool_idle_timeout must be greater than 0".into(),
            suggestion: None,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// One-line summary printed by `cors-relay validate` on success.
#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let timeout = config
        .relay
        .upstream_timeout
        .map_or_else(|| "none".to_string(), |ms| format!("{ms}ms"));
    format!(
        "{path} is valid (listen {}:{}, relay path {}, upstream timeout {timeout})",
        config.server.host, config.server.port, config.relay.path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn relay_path_rules() {
        assert!(validate_relay_path("/api/proxy").is_ok());
        assert!(validate_relay_path("/").is_ok());
        assert!(validate_relay_path("").is_err());
        assert!(validate_relay_path("/health").is_err());
        assert!(validate_relay_path("/proxy/:id").is_err());
        assert!(validate_relay_path("/proxy/{*rest}").is_err());
        assert!(validate_relay_path("/proxy?x=1").is_err());
    }

    #[test]
    fn relative_path_gets_suggestion() {
        let mut config = Config::default();
        config.relay.path = "proxy".into();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "path");
        assert_eq!(errors[0].suggestion.as_deref(), Some("did you mean '/proxy'?"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = Config::default();
        config.server.host = "localhost".into();
        config.server.port = 0;
        config.server.max_body = 0;
        config.relay.upstream_timeout = Some(0);
        config.relay.pool_idle_timeout = 0;

        let errors = validate(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            ["host", "port", "max_body", "upstream_timeout", "pool_idle_timeout"]
        );
        assert_eq!(errors[0].suggestion.as_deref(), Some("use '127.0.0.1'"));
    }

    #[test]
    fn report_mentions_timeout() {
        let mut config = Config::default();
        config.relay.upstream_timeout = Some(2500);
        let report = format_validation_report("cors-relay.yaml", &config);
        assert!(report.contains("upstream timeout 2500ms"));
        assert!(report.contains("relay path /api/proxy"));
    }
}
