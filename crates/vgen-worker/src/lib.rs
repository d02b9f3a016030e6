//! Assembly worker.
//!
//! This crate provides:
//! - The assembly orchestrator (validate, synthesize, avatar, scenes, compose)
//! - Bounded scene dispatch within a request
//! - A request executor with cancellation handles
//! - The content directory layout shared with the API

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod orchestrator;
pub mod store;

pub use config::WorkerConfig;
pub use error::{AssemblyError, ErrorClass, WorkerResult};
pub use executor::{AbortSignal, AssemblyExecutor, AssemblyHandle};
pub use logging::JobLogger;
pub use orchestrator::AssemblyOrchestrator;
pub use store::{ensure_artifact, ContentStore};
