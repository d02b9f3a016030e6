//! Request executor.

use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{info, Instrument};

use vgen_models::{AssemblyRequest, AssemblyResult, AssemblyStage, JobId};

use crate::config::WorkerConfig;
use crate::error::{AssemblyError, WorkerResult};
use crate::logging::JobLogger;
use crate::orchestrator::AssemblyOrchestrator;

/// Runs assembly requests with a bound on how many run at once.
#[derive(Clone)]
pub struct AssemblyExecutor {
    orchestrator: Arc<AssemblyOrchestrator>,
    request_semaphore: Arc<Semaphore>,
}

impl AssemblyExecutor {
    pub fn new(orchestrator: AssemblyOrchestrator, config: &WorkerConfig) -> Self {
        info!(
            "Assembly executor ready with {} concurrent requests",
            config.max_concurrent_requests
        );
        Self {
            orchestrator: Arc::new(orchestrator),
            request_semaphore: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
        }
    }

    pub fn orchestrator(&self) -> &AssemblyOrchestrator {
        &self.orchestrator
    }

    /// Requests that could start right now.
    pub fn available_slots(&self) -> usize {
        self.request_semaphore.available_permits()
    }

    /// Start `request` in the background.
    pub fn submit(&self, request: AssemblyRequest) -> AssemblyHandle {
        let request_id = JobId::new();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (stage_tx, stage_rx) = watch::channel(AssemblyStage::Validating);

        let orchestrator = Arc::clone(&self.orchestrator);
        let semaphore = Arc::clone(&self.request_semaphore);
        let id = request_id.clone();
        let span = JobLogger::new(&request_id).create_span();

        let task = tokio::spawn(
            async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    // Closed during shutdown.
                    stage_tx.send_replace(AssemblyStage::Aborted);
                    return Err(AssemblyError::Aborted);
                };
                orchestrator
                    .run_tracked(id, request, cancel_rx, &stage_tx)
                    .await
            }
            .instrument(span),
        );

        AssemblyHandle {
            request_id,
            cancel: AbortSignal(cancel_tx),
            stage: stage_rx,
            task,
        }
    }

    /// Run `request` to completion. Dropping the future cancels the request.
    pub async fn execute(&self, request: AssemblyRequest) -> WorkerResult<AssemblyResult> {
        let handle = self.submit(request);
        let mut guard = AbortOnDrop(Some(handle.abort_signal()));
        let result = handle.wait().await;
        guard.disarm();
        result
    }

    /// Stop accepting requests.
    pub fn close(&self) {
        self.request_semaphore.close();
    }
}

/// Cancels a request from anywhere, e.g. a signal handler.
#[derive(Debug, Clone)]
pub struct AbortSignal(watch::Sender<bool>);

impl AbortSignal {
    pub fn abort(&self) {
        self.0.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.0.borrow()
    }
}

struct AbortOnDrop(Option<AbortSignal>);

impl AbortOnDrop {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if let Some(signal) = self.0.take() {
            signal.abort();
        }
    }
}

/// A running request.
pub struct AssemblyHandle {
    request_id: JobId,
    cancel: AbortSignal,
    stage: watch::Receiver<AssemblyStage>,
    task: JoinHandle<WorkerResult<AssemblyResult>>,
}

impl AssemblyHandle {
    pub fn request_id(&self) -> &JobId {
        &self.request_id
    }

    /// Latest stage reached.
    pub fn stage(&self) -> AssemblyStage {
        *self.stage.borrow()
    }

    /// Receiver that observes every stage change.
    pub fn subscribe(&self) -> watch::Receiver<AssemblyStage> {
        self.stage.clone()
    }

    /// Request cancellation. The request ends as `Aborted` at its next checkpoint.
    pub fn abort(&self) {
        self.cancel.abort();
    }

    pub fn abort_signal(&self) -> AbortSignal {
        self.cancel.clone()
    }

    pub async fn wait(self) -> WorkerResult<AssemblyResult> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(AssemblyError::integrity(format!("assembly task failed: {e}"))),
        }
    }
}
