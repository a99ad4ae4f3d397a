//! Integration tests for config parsing across file formats.

use cors_relay::config::model::Config;
use cors_relay::config::parse_config_str;
use cors_relay::config::validation::validate;
use cors_relay::error::RelayError;

#[cfg(feature = "yaml")]
#[test]
fn yaml_partial_config_fills_defaults() {
    let content = "relay:\n  path: /relay\n  upstream_timeout: 1500\n";
    let config = parse_config_str("yaml", content, "cors-relay.yaml").unwrap();
    validate(&config).unwrap();

    assert_eq!(config.relay.path, "/relay");
    assert_eq!(config.relay.upstream_timeout, Some(1500));
    assert_eq!(config.relay.pool_idle_timeout, 30);
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.max_body, 1_048_576);
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_unknown_field_is_a_parse_error() {
    let content = "relay:\n  path: /relay\n  retries: 3\n";
    let err = parse_config_str("yaml", content, "cors-relay.yaml").unwrap_err();
    assert!(matches!(err, RelayError::ConfigParse { .. }));
    assert!(err.to_string().contains("cors-relay.yaml"));
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_invalid_values_fail_validation() {
    let content = "server:\n  host: localhost\nrelay:\n  path: /health\n";
    let config = parse_config_str("yaml", content, "cors-relay.yaml").unwrap();
    let errors = validate(&config).unwrap_err();
    assert_eq!(errors.len(), 2);

    let message = RelayError::ConfigValidation { errors }.to_string();
    assert!(message.contains("server.host"));
    assert!(message.contains("relay.path"));
}

#[cfg(feature = "json")]
#[test]
fn json_config_loads() {
    let content = r#"{ "server": { "port": 8080 }, "relay": { "path": "/cors" } }"#;
    let config = parse_config_str("json", content, "cors-relay.json").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.relay.path, "/cors");
}

#[cfg(feature = "toml")]
#[test]
fn toml_config_loads() {
    let content = "[server]\nhost = \"127.0.0.1\"\n\n[relay]\nupstream_timeout = 750\n";
    let config = parse_config_str("toml", content, "cors-relay.toml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.relay.upstream_timeout, Some(750));
}

#[cfg(all(feature = "yaml", feature = "json", feature = "toml"))]
#[test]
fn all_formats_produce_equivalent_configs() {
    let yaml = parse_config_str(
        "yaml",
        "server:\n  port: 9000\nrelay:\n  path: /p\n",
        "c.yaml",
    )
    .unwrap();
    let json = parse_config_str(
        "json",
        r#"{"server":{"port":9000},"relay":{"path":"/p"}}"#,
        "c.json",
    )
    .unwrap();
    let toml = parse_config_str("toml", "[server]\nport = 9000\n[relay]\npath = \"/p\"\n", "c.toml")
        .unwrap();
    assert_eq!(yaml, json);
    assert_eq!(json, toml);
}

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.relay.path, "/api/proxy");
    assert_eq!(config.relay.upstream_timeout, None);
}
