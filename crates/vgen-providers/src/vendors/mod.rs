//! Vendor HTTP clients.

mod azure;
mod deepbrain;
mod google;
mod runway;
mod synthesia;
mod zebracat;

pub use azure::AzureTts;
pub use deepbrain::DeepBrainAvatar;
pub use google::GoogleTts;
pub use runway::RunwayScene;
pub use synthesia::SynthesiaAvatar;
pub use zebracat::ZebracatScene;
