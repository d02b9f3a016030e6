//! Speech, avatar and scene generation backends.
//!
//! Each artifact kind is served by a [`GenerationAdapter`] that dispatches to one vendor
//! selected at construction time and, under [`FallbackPolicy::BestEffort`], substitutes a
//! deterministic offline placeholder whenever the vendor is missing or fails.

pub mod adapter;
pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod offline;
pub mod params;
pub mod poll;
pub mod registry;
pub mod vendors;

pub use adapter::GenerationAdapter;
pub use backend::GenerationBackend;
pub use config::{Credentials, Endpoints, FallbackPolicy, ProvidersConfig};
pub use error::{ProviderError, ProviderResult};
pub use offline::{scene_color, OfflineGenerator};
pub use params::{vendor_seconds, AvatarParams, SceneParams, SpeechParams};
pub use poll::{PollConfig, PollStatus};
pub use registry::{ProviderStatus, Providers};
