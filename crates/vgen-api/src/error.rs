//! API error types.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vgen_models::RequestError;
use vgen_worker::{AssemblyError, ErrorClass};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Assembly(#[from] AssemblyError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Assembly(e) => match e.class() {
                ErrorClass::ClientError => StatusCode::BAD_REQUEST,
                ErrorClass::VendorError => StatusCode::BAD_GATEWAY,
                ErrorClass::IntegrityError => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorClass::Aborted => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::Assembly(e) => Some(e.class().as_str()),
            _ => None,
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        Self::Assembly(AssemblyError::from(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR
            && std::env::var("ENVIRONMENT")
                .map(|e| e.eq_ignore_ascii_case("production"))
                .unwrap_or(false)
        {
            "An internal error occurred".to_string()
        } else {
            match &self {
                ApiError::Assembly(e) => e.to_string(),
                other => other.to_string(),
            }
        };

        let body = ErrorResponse {
            detail,
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assembly_status_mapping() {
        let client = ApiError::from(AssemblyError::from(RequestError::MissingAvatar));
        assert_eq!(client.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(client.code(), Some("client_error"));

        let integrity = ApiError::from(AssemblyError::integrity("scene missing"));
        assert_eq!(integrity.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let aborted = ApiError::from(AssemblyError::Aborted);
        assert_eq!(aborted.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
