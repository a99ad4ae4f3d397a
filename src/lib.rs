//! cors-relay is an HTTP forwarding relay for browser clients.
//!
//! A caller sends a request to the relay path with the real destination
//! in the `Target-URL` header. The relay re-issues it server-side, where
//! same-origin rules do not apply, and returns the upstream's status and
//! body with `Access-Control-Allow-Origin: *` attached.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate, health).
//! - [`config`] -- Optional config file loading, CLI overrides, and validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`relay`] -- The forwarder: per-verb header policies, target URL handling,
//!   the upstream client seam, and the GET / POST handlers.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `sentry-integration` | Sentry error tracking |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod relay;
pub mod server;

#[cfg(feature = "sentry-integration")]
pub mod sentry_integration;
