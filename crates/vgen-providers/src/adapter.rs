//! Vendor-or-offline dispatch for one kind of artifact.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use vgen_models::{GenerationJob, JobKind, ProviderKind};

use crate::backend::GenerationBackend;
use crate::config::FallbackPolicy;
use crate::error::ProviderResult;
use crate::offline::OfflineGenerator;

/// Routes jobs of one kind to the configured vendor, falling back to the offline
/// generator under [`FallbackPolicy::BestEffort`].
///
/// The adapter owns the job lifecycle: `Pending -> Running -> Succeeded | Failed`.
pub struct GenerationAdapter<P> {
    kind: JobKind,
    /// Vendor the configuration asked for
    requested: ProviderKind,
    primary: Option<Arc<dyn GenerationBackend<P>>>,
    offline: OfflineGenerator,
    policy: FallbackPolicy,
}

impl<P> GenerationAdapter<P>
where
    P: Serialize + Send + Sync,
    OfflineGenerator: GenerationBackend<P>,
{
    pub fn new(
        kind: JobKind,
        primary: Arc<dyn GenerationBackend<P>>,
        offline: OfflineGenerator,
        policy: FallbackPolicy,
    ) -> Self {
        Self {
            kind,
            requested: primary.provider(),
            primary: Some(primary),
            offline,
            policy,
        }
    }

    /// Adapter whose vendor could not be constructed (e.g. missing credentials).
    pub fn unconfigured(
        kind: JobKind,
        requested: ProviderKind,
        offline: OfflineGenerator,
        policy: FallbackPolicy,
    ) -> Self {
        Self {
            kind,
            requested,
            primary: None,
            offline,
            policy,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Provider jobs are expected to run on.
    pub fn requested_provider(&self) -> ProviderKind {
        self.requested
    }

    pub fn has_vendor(&self) -> bool {
        self.primary.is_some()
    }

    /// New pending job for `params`.
    pub fn new_job(&self, params: &P) -> GenerationJob {
        let request_params = serde_json::to_value(params).unwrap_or_default();
        GenerationJob::new(self.kind, self.requested, request_params)
    }

    /// Run `job` and write its artifact to `output`.
    ///
    /// Under best-effort only a failing offline write is returned as an error.
    pub async fn generate(
        &self,
        job: &mut GenerationJob,
        params: &P,
        output: &Path,
    ) -> ProviderResult<()> {
        job.start()?;
        let uri = output.to_string_lossy().to_string();

        match &self.primary {
            Some(primary) => match primary.generate(params, output).await {
                Ok(()) => {
                    info!(
                        job_id = %job.id,
                        kind = self.kind.as_str(),
                        provider = primary.provider().as_str(),
                        "Artifact generated"
                    );
                    job.succeed(primary.provider(), uri)?;
                    return Ok(());
                }
                Err(e) if self.policy == FallbackPolicy::Strict => {
                    warn!(job_id = %job.id, kind = self.kind.as_str(), "Vendor failed: {}", e);
                    job.fail(e.to_string())?;
                    return Err(e);
                }
                Err(e) => {
                    self.record_fallback(job, &e.to_string());
                }
            },
            None => {
                // Strict adapters are never built without a vendor.
                if self.requested != ProviderKind::Offline {
                    self.record_fallback(job, "vendor not configured");
                }
            }
        }

        match self.offline.generate(params, output).await {
            Ok(()) => {
                job.succeed(ProviderKind::Offline, uri)?;
                Ok(())
            }
            Err(e) => {
                job.fail(e.to_string())?;
                Err(e)
            }
        }
    }

    fn record_fallback(&self, job: &mut GenerationJob, reason: &str) {
        warn!(
            job_id = %job.id,
            kind = self.kind.as_str(),
            provider = self.requested.as_str(),
            "Falling back to offline generator: {}",
            reason
        );
        metrics::counter!(
            "vgen_provider_fallbacks_total",
            "kind" => self.kind.as_str(),
            "provider" => self.requested.as_str()
        )
        .increment(1);
        job.note_error(reason);
    }
}
