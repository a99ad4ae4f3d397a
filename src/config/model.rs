//! Serde data structures for the relay configuration file.
//!
//! Contains [`Config`] (the root), [`ServerConfig`], and [`RelayConfig`].
//! Every field has a default, so an empty file is a valid config. All
//! types derive `Serialize` and `Deserialize` with `deny_unknown_fields`
//! for strict parsing.

use serde::{Deserialize, Serialize};

pub const DEFAULT_RELAY_PATH: &str = "/api/proxy";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_body() -> usize {
    1_048_576
}

fn default_path() -> String {
    DEFAULT_RELAY_PATH.to_string()
}

const fn default_pool_idle_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Max request body size in bytes.
    #[serde(default = "default_max_body")]
    pub max_body: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body: default_max_body(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Route that answers relay `GET` and `POST` requests.
    #[serde(default = "default_path")]
    pub path: String,

    /// Upstream timeout in milliseconds. Unset means the client never
    /// gives up on its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_timeout: Option<u64>,

    /// Idle pooled connections are closed after this many seconds.
    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            upstream_timeout: None,
            pool_idle_timeout: default_pool_idle_timeout(),
        }
    }
}
