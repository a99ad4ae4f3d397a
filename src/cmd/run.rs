//! `cors-relay run` — start the relay server.
//!
//! Resolves configuration (file, then CLI / env overrides), builds the
//! upstream client, and serves the Axum router until Ctrl+C or SIGTERM.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cli::RunArgs;
use crate::config::{self, validation};
use crate::error::RelayError;
use crate::logging;
use crate::relay::upstream::HyperUpstream;
use crate::server::{self, AppState, Stats};

pub async fn execute(args: RunArgs) -> Result<(), RelayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    #[cfg(feature = "sentry-integration")]
    let _sentry_guard = args
        .sentry_dsn
        .as_ref()
        .map(|dsn| crate::sentry_integration::init(dsn, args.sentry_environment.as_deref()));

    let (mut config, origin) = config::resolve(args.config.as_deref()).await?;
    args.overrides().apply(&mut config);

    // Overrides bypass file validation, so check the merged result again.
    if let Err(errors) = validation::validate(&config) {
        return Err(RelayError::ConfigValidation { errors });
    }

    let upstream_timeout = config.relay.upstream_timeout.map(Duration::from_millis);
    let client =
        server::build_http_client(Duration::from_secs(config.relay.pool_idle_timeout));

    let state = Arc::new(AppState {
        upstream: Arc::new(HyperUpstream::new(client, upstream_timeout)),
        relay_path: config.relay.path.clone(),
        upstream_timeout_ms: config.relay.upstream_timeout,
        start_time: Instant::now(),
        stats: Stats::new(),
    });

    let router = server::build_router(state, config.server.max_body);

    let addr = SocketAddr::new(config.server.host.parse::<IpAddr>()?, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        path = %config.relay.path,
        config = %origin,
        upstream_timeout_ms = ?config.relay.upstream_timeout,
        "cors-relay started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("cors-relay stopped");
    Ok(())
}
