//! HTTP surface for video assembly.
//!
//! This crate provides:
//! - `POST /api/generate`, which runs one assembly request to completion
//! - Language, voice and avatar catalogs
//! - Streaming of assembled videos and narration audio
//! - Health probes and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
