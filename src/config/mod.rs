//! Configuration loading, resolution, and validation.
//!
//! A config file is optional. [`resolve`] picks an explicit path, falls
//! back to auto-detecting `cors-relay.{yaml,yml,json,toml}` in the working
//! directory, and otherwise uses the built-in defaults. Submodules provide
//! the data model and validation logic.

pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::RelayError;
use model::Config;

pub const AUTO_DETECT_CANDIDATES: &[&str] = &[
    "cors-relay.yaml",
    "cors-relay.yml",
    "cors-relay.json",
    "cors-relay.toml",
];

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, RelayError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => {
            // serde_yml rejects an empty document; an empty file means "all defaults".
            if content.trim().is_empty() {
                return Ok(Config::default());
            }
            serde_yml::from_str(content).map_err(|e| RelayError::ConfigParse {
                path: path_display.to_string(),
                source: Box::new(e),
            })
        }

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| RelayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| RelayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(RelayError::UnsupportedFormat(other.to_string())),
    }
}

/// Read, parse, and validate one config file.
pub async fn load_file(path: &Path) -> Result<Config, RelayError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RelayError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RelayError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let config = parse_config_str(ext, &content, &path.display().to_string())?;

    if let Err(errors) = validation::validate(&config) {
        return Err(RelayError::ConfigValidation { errors });
    }
    Ok(config)
}

pub async fn resolve(explicit: Option<&Path>) -> Result<(Config, ConfigOrigin), RelayError> {
    if let Some(path) = explicit {
        let config = load_file(path).await?;
        return Ok((config, ConfigOrigin::File(path.to_path_buf())));
    }

    for name in AUTO_DETECT_CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            let config = load_file(&path).await?;
            return Ok((config, ConfigOrigin::File(path)));
        }
    }

    Ok((Config::default(), ConfigOrigin::Defaults))
}

/// Values from CLI flags or their environment variables. `Some` wins over
/// whatever the config file said.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_body: Option<usize>,
    pub path: Option<String>,
    pub upstream_timeout: Option<u64>,
}

impl Overrides {
    pub fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(max_body) = self.max_body {
            config.server.max_body = max_body;
        }
        if let Some(path) = self.path {
            config.relay.path = path;
        }
        if let Some(timeout) = self.upstream_timeout {
            config.relay.upstream_timeout = Some(timeout);
        }
    }
}
