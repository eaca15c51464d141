// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, net::SocketAddr, path::PathBuf, sync::Arc};

use cadence_web_auth::{
    api::router,
    auth::ResolutionPolicy,
    config::{ConfigKey, ConfigSource, EnvConfigSource, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    domain::InMemoryDomainDirectory,
    grpc::initialize_tls,
    state::AppState,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = Arc::new(EnvConfigSource);

    // Backend channel credentials are fixed for the lifetime of the process.
    let ca_file = config.get_config_value(ConfigKey::GrpcTlsCaFile).await?;
    let credentials = initialize_tls(ca_file.as_deref().map(std::path::Path::new))?;
    tracing::info!(mode = credentials.mode(), "Backend channel credentials ready");

    let domains = match config.get_config_value(ConfigKey::DomainsFile).await? {
        Some(path) => {
            let path = PathBuf::from(path);
            let directory = InMemoryDomainDirectory::from_json_file(&path)?;
            tracing::info!(
                path = %path.display(),
                domains = directory.len().await,
                "Loaded domain directory"
            );
            directory
        }
        None => InMemoryDomainDirectory::new(),
    };

    let policy = ResolutionPolicy::from_config(config.as_ref()).await?;
    tracing::info!(token_sources = ?policy.token_sources, "Auth token sources configured");

    let state = AppState::new(config.clone(), Arc::new(domains)).with_policy(policy);
    let app = router(state);

    let host = config
        .get_config_value(ConfigKey::Host)
        .await?
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let port: u16 = config
        .get_config_value(ConfigKey::Port)
        .await?
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Cadence web auth listening (docs at /docs)");

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
