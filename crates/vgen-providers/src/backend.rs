//! Backend trait implemented by vendor clients and the offline generator.

use std::path::Path;

use async_trait::async_trait;
use vgen_models::ProviderKind;

use crate::error::ProviderResult;

/// Produces one artifact of a given kind from parameters `P`.
#[async_trait]
pub trait GenerationBackend<P>: Send + Sync {
    fn provider(&self) -> ProviderKind;

    /// Write the artifact to `output`.
    async fn generate(&self, params: &P, output: &Path) -> ProviderResult<()>;
}
