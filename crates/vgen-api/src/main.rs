//! Axum API server binary.

use std::future::IntoFuture;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vgen_api::{create_router, metrics, ApiConfig, AppState};
use vgen_providers::ProvidersConfig;
use vgen_worker::{AssemblyExecutor, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    init_tracing()?;

    info!("Starting vgen-api");

    let config = ApiConfig::from_env();
    info!("API config: host={}, port={}", config.host, config.port);

    let worker = WorkerConfig::from_env();
    info!("Worker config: {:?}", worker);
    let shutdown_timeout = worker.shutdown_timeout;

    let state = AppState::new(config.clone(), worker, ProvidersConfig::from_env()?)
        .await
        .context("Failed to create application state")?;
    for status in state.providers().status() {
        info!(
            kind = status.kind.as_str(),
            provider = status.provider.as_str(),
            mode = status.mode,
            "Provider ready"
        );
    }

    let metrics_handle = if config.metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    let executor = state.executor.clone();
    let app = create_router(state, metrics_handle);

    let addr = config.bind_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(executor));

    // Give in-flight assemblies a bounded window once the signal arrives.
    tokio::select! {
        result = server.into_future() => result?,
        _ = async {
            shutdown_requested().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => warn!("Shutdown timeout after {:?}, dropping in-flight requests", shutdown_timeout),
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vgen=info".parse()?)
        .add_directive("tower_http=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
    Ok(())
}

async fn shutdown_requested() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; never resolve.
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal(executor: AssemblyExecutor) {
    shutdown_requested().await;
    info!("Received shutdown signal");
    executor.close();
}
