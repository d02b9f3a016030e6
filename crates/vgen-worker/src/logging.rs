//! Structured request logging.
//!
//! Every line carries the request id and the assembly stage it was emitted from.

use tracing::{error, info, warn, Span};
use vgen_models::{AssemblyStage, JobId};

/// Logger for one assembly request.
#[derive(Debug, Clone)]
pub struct JobLogger {
    request_id: String,
    stage: AssemblyStage,
}

impl JobLogger {
    pub fn new(request_id: &JobId) -> Self {
        Self {
            request_id: request_id.to_string(),
            stage: AssemblyStage::Validating,
        }
    }

    /// Move to `stage` and log the transition.
    pub fn enter(&mut self, stage: AssemblyStage) {
        self.stage = stage;
        info!(
            request_id = %self.request_id,
            stage = stage.as_str(),
            progress = stage.progress(),
            "Stage started"
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            stage = self.stage.as_str(),
            "Assembly progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            request_id = %self.request_id,
            stage = self.stage.as_str(),
            "Assembly warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            request_id = %self.request_id,
            stage = self.stage.as_str(),
            "Assembly error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            stage = self.stage.as_str(),
            "Assembly completed: {}", message
        );
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn stage(&self) -> AssemblyStage {
        self.stage
    }

    pub fn create_span(&self) -> Span {
        tracing::info_span!("assembly", request_id = %self.request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_tracks_stage() {
        let id = JobId::from_string("req-1");
        let mut logger = JobLogger::new(&id);
        assert_eq!(logger.request_id(), "req-1");
        assert_eq!(logger.stage(), AssemblyStage::Validating);

        logger.enter(AssemblyStage::Composing);
        assert_eq!(logger.stage(), AssemblyStage::Composing);
    }
}
