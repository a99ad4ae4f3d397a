//! `cors-relay init` — generate a starter configuration file.
//!
//! The minimal config is the serialized defaults; `--full` writes a
//! commented template documenting every option.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::config::model::Config;
use crate::error::RelayError;

pub fn execute(args: &InitArgs) -> Result<(), RelayError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("cors-relay.{}", args.format.extension())));

    if output.exists() {
        return Err(RelayError::FileExists { path: output });
    }

    let content = render(&args.format, args.full)?;
    std::fs::write(&output, content)?;
    println!("Created {}", output.display());
    Ok(())
}

pub fn render(format: &ConfigFormat, full: bool) -> Result<String, RelayError> {
    if full {
        return Ok(match format {
            ConfigFormat::Yaml => YAML_FULL,
            ConfigFormat::Json => JSON_FULL,
            ConfigFormat::Toml => TOML_FULL,
        }
        .to_string());
    }
    serialize_config(&Config::default(), format)
}

/// Serialize a `Config` to a formatted string in the given format.
pub fn serialize_config(config: &Config, format: &ConfigFormat) -> Result<String, RelayError> {
    match format {
        #[cfg(feature = "yaml")]
        ConfigFormat::Yaml => serde_yml::to_string(config)
            .map_err(|e| RelayError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(not(feature = "yaml"))]
        ConfigFormat::Yaml => Err(RelayError::UnsupportedFormat("yaml".into())),

        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| RelayError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(feature = "toml")]
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| RelayError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(not(feature = "toml"))]
        ConfigFormat::Toml => Err(RelayError::UnsupportedFormat("toml".into())),
    }
}

const YAML_FULL: &str = r#"# cors-relay config
#
# All values shown are defaults. CLI flags and their environment
# variables (HOST, PORT, MAX_BODY_SIZE, RELAY_PATH, UPSTREAM_TIMEOUT_MS)
# override anything set here.

server:
  host: "0.0.0.0"          # Listen address (IP only)
  port: 3000               # Listen port
  max_body: 1048576        # Max request body in bytes

relay:
  path: "/api/proxy"       # Route answering relay GET and POST
  # upstream_timeout: 5000 # Give up on the upstream after N ms (default: never)
  pool_idle_timeout: 30    # Close idle upstream connections after N seconds
"#;

const JSON_FULL: &str = r#"{
  "server": {
    "host": "0.0.0.0",
    "port": 3000,
    "max_body": 1048576
  },
  "relay": {
    "path": "/api/proxy",
    "upstream_timeout": 5000,
    "pool_idle_timeout": 30
  }
}
"#;

const TOML_FULL: &str = r#"# cors-relay config
#
# All values shown are defaults. CLI flags and their environment
# variables (HOST, PORT, MAX_BODY_SIZE, RELAY_PATH, UPSTREAM_TIMEOUT_MS)
# override anything set here.

[server]
host = "0.0.0.0"          # Listen address (IP only)
port = 3000               # Listen port
max_body = 1048576        # Max request body in bytes

[relay]
path = "/api/proxy"       # Route answering relay GET and POST
# upstream_timeout = 5000 # Give up on the upstream after N ms (default: never)
pool_idle_timeout = 30    # Close idle upstream connections after N seconds
"#;
