//! Assembly worker binary: assembles one request read from a JSON file or stdin.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vgen_media::FfmpegCompositor;
use vgen_models::AssemblyRequest;
use vgen_providers::{Providers, ProvidersConfig};
use vgen_worker::{AssemblyExecutor, AssemblyOrchestrator, ErrorClass, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing()?;

    info!("Starting vgen-worker");

    let request = read_request(std::env::args().nth(1)).await?;

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let providers = Providers::from_config(ProvidersConfig::from_env()?)?;
    for status in providers.status() {
        info!(
            kind = status.kind.as_str(),
            provider = status.provider.as_str(),
            mode = status.mode,
            "Provider ready"
        );
    }

    let compositor = FfmpegCompositor::new().with_timeout(config.compose_timeout.as_secs());
    let orchestrator =
        AssemblyOrchestrator::new(Arc::new(providers), Arc::new(compositor), config.clone());
    orchestrator.store().init().await?;
    let executor = AssemblyExecutor::new(orchestrator, &config);

    let handle = executor.submit(request);
    let request_id = handle.request_id().clone();
    info!("Assembling request {}", request_id);

    let signal = handle.abort_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received shutdown signal, aborting request");
            signal.abort();
        }
    });

    match handle.wait().await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            let class = e.class();
            error!(class = class.as_str(), "Request {} failed: {}", request_id, e);
            std::process::exit(match class {
                ErrorClass::ClientError => 2,
                ErrorClass::VendorError => 3,
                ErrorClass::IntegrityError => 4,
                ErrorClass::Aborted => 130,
            })
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vgen=info".parse()?)
        .add_directive("vgen_worker=info".parse()?)
        .add_directive("hyper=warn".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

async fn read_request(path: Option<String>) -> anyhow::Result<AssemblyRequest> {
    let raw = match path.as_deref() {
        None | Some("-") => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("reading request from stdin")?;
            buf
        }
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading request file {path}"))?,
    };
    serde_json::from_str(&raw).context("parsing assembly request")
}
