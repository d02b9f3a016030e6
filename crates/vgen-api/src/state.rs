//! Application state.

use std::sync::Arc;

use vgen_media::FfmpegCompositor;
use vgen_providers::{Providers, ProvidersConfig};
use vgen_worker::{AssemblyExecutor, AssemblyOrchestrator, ContentStore, WorkerConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub executor: AssemblyExecutor,
}

impl AppState {
    /// Create new application state from the environment-derived configs.
    pub async fn new(
        config: ApiConfig,
        worker: WorkerConfig,
        providers: ProvidersConfig,
    ) -> anyhow::Result<Self> {
        let providers = Providers::from_config(providers)?;
        let compositor = FfmpegCompositor::new().with_timeout(worker.compose_timeout.as_secs());
        let orchestrator =
            AssemblyOrchestrator::new(Arc::new(providers), Arc::new(compositor), worker.clone());
        orchestrator.store().init().await?;

        Ok(Self::with_executor(
            config,
            AssemblyExecutor::new(orchestrator, &worker),
        ))
    }

    pub fn with_executor(config: ApiConfig, executor: AssemblyExecutor) -> Self {
        Self { config, executor }
    }

    pub fn store(&self) -> &ContentStore {
        self.executor.orchestrator().store()
    }

    pub fn providers(&self) -> &Providers {
        self.executor.orchestrator().providers()
    }
}
