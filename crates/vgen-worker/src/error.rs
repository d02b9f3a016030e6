//! Worker error types.

use serde::Serialize;
use thiserror::Error;

use vgen_analysis::AnalysisError;
use vgen_media::MediaError;
use vgen_models::{JobTransitionError, RequestError};
use vgen_providers::ProviderError;

pub type WorkerResult<T> = Result<T, AssemblyError>;

/// How a failed request is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The request itself is unusable; nothing was dispatched
    ClientError,
    /// A vendor or the compositor failed under the strict policy
    VendorError,
    /// An artifact that should exist does not
    IntegrityError,
    Aborted,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::ClientError => "client_error",
            ErrorClass::VendorError => "vendor_error",
            ErrorClass::IntegrityError => "integrity_error",
            ErrorClass::Aborted => "aborted",
        }
    }
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("Invalid request: {0}")]
    Client(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Composition failed: {0}")]
    Composition(#[from] MediaError),

    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Job state error: {0}")]
    Transition(#[from] JobTransitionError),

    #[error("Request aborted")]
    Aborted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssemblyError {
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            AssemblyError::Request(_) | AssemblyError::Client(_) => ErrorClass::ClientError,
            AssemblyError::Provider(e) if e.is_vendor_error() => ErrorClass::VendorError,
            AssemblyError::Provider(ProviderError::MissingCredentials(_)) => {
                ErrorClass::VendorError
            }
            AssemblyError::Composition(_) => ErrorClass::VendorError,
            AssemblyError::Aborted => ErrorClass::Aborted,
            AssemblyError::Provider(_)
            | AssemblyError::Integrity(_)
            | AssemblyError::Analysis(_)
            | AssemblyError::Transition(_)
            | AssemblyError::Io(_) => ErrorClass::IntegrityError,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.class() == ErrorClass::ClientError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert_eq!(
            AssemblyError::from(RequestError::MissingVoice).class(),
            ErrorClass::ClientError
        );
        assert_eq!(
            AssemblyError::from(ProviderError::Status {
                vendor: "google",
                status: 500,
                body: String::new(),
            })
            .class(),
            ErrorClass::VendorError
        );
        assert_eq!(
            AssemblyError::integrity("missing avatar").class(),
            ErrorClass::IntegrityError
        );
        assert_eq!(AssemblyError::Aborted.class(), ErrorClass::Aborted);
        assert_eq!(
            AssemblyError::from(AnalysisError::InvalidDuration(-1.0)).class(),
            ErrorClass::IntegrityError
        );
    }

    #[test]
    fn test_class_serialization() {
        let json = serde_json::to_string(&ErrorClass::VendorError).unwrap();
        assert_eq!(json, "\"vendor_error\"");
    }
}
