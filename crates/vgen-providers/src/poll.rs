//! Bounded polling for asynchronous vendor jobs.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempts: 30,
            delay: Duration::from_secs(10),
        }
    }
}

impl PollConfig {
    pub fn from_env() -> Self {
        Self {
            attempts: std::env::var("VGEN_POLL_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(30),
            delay: Duration::from_secs(
                std::env::var("VGEN_POLL_DELAY_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }

    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

/// One observation of a remote job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus<T> {
    Pending,
    Ready(T),
    Failed(String),
}

/// Call `check` until it reports a terminal status or attempts run out.
///
/// Transport errors end the loop immediately.
pub async fn poll_until<T, F, Fut>(
    vendor: &'static str,
    config: &PollConfig,
    mut check: F,
) -> ProviderResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ProviderResult<PollStatus<T>>>,
{
    for attempt in 1..=config.attempts {
        match check(attempt).await? {
            PollStatus::Ready(value) => return Ok(value),
            PollStatus::Failed(message) => {
                return Err(ProviderError::vendor_failed(vendor, message))
            }
            PollStatus::Pending => {
                debug!("{} job pending (attempt {}/{})", vendor, attempt, config.attempts);
                if attempt < config.attempts {
                    tokio::time::sleep(config.delay).await;
                }
            }
        }
    }
    Err(ProviderError::PollExhausted {
        attempts: config.attempts,
    })
}
