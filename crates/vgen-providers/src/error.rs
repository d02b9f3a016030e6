//! Provider error types.

use thiserror::Error;
use vgen_media::MediaError;
use vgen_models::JobTransitionError;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{vendor} returned {status}: {body}")]
    Status {
        vendor: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {vendor}: {message}")]
    InvalidResponse {
        vendor: &'static str,
        message: String,
    },

    #[error("{vendor} reported failure: {message}")]
    VendorFailed {
        vendor: &'static str,
        message: String,
    },

    #[error("Gave up polling after {attempts} attempts")]
    PollExhausted { attempts: u32 },

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error(transparent)]
    Transition(#[from] JobTransitionError),
}

impl ProviderError {
    pub fn invalid_response(vendor: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            vendor,
            message: message.into(),
        }
    }

    pub fn vendor_failed(vendor: &'static str, message: impl Into<String>) -> Self {
        Self::VendorFailed {
            vendor,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Errors raised by (or on the way to) a remote vendor.
    pub fn is_vendor_error(&self) -> bool {
        matches!(
            self,
            Self::Status { .. }
                | Self::InvalidResponse { .. }
                | Self::VendorFailed { .. }
                | Self::PollExhausted { .. }
                | Self::Network(_)
                | Self::Json(_)
        )
    }
}
