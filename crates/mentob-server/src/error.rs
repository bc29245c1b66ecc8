//! Server and API error types.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mentob_llm::LlmError;
use mentob_metrics::{
    ERROR_BILLING, ERROR_CONFIG, ERROR_LLM, ERROR_NOT_FOUND, ERROR_QUOTA, ERROR_STORE,
    ERROR_VALIDATION, record_error,
};
use mentob_store::StoreError;
use serde::Serialize;
use serde_json::Value;

use crate::billing::BillingError;

/// Startup and runtime errors of the server itself.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(String),
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("llm: {0}")]
    Llm(#[from] LlmError),
    #[error("billing: {0}")]
    Billing(#[from] BillingError),
}

impl ServerError {
    /// Get the error type string for metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Io(_) | ServerError::Config(_) => ERROR_CONFIG,
            ServerError::Store(_) => ERROR_STORE,
            ServerError::Llm(_) => ERROR_LLM,
            ServerError::Billing(_) => ERROR_BILLING,
        }
    }
}

/// Machine-readable error code carried in every error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    InvalidSpread,
    InvalidCards,
    MissingRequiredFields,
    QuotaExceeded,
    NotFound,
    LlmError,
    DatabaseError,
    BackendError,
    InternalError,
}

impl ErrorCode {
    /// Default HTTP status for the code.
    pub fn status(self) -> StatusCode {
        match self {
            Self::InvalidRequest
            | Self::InvalidSpread
            | Self::InvalidCards
            | Self::MissingRequiredFields => StatusCode::BAD_REQUEST,
            Self::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BackendError => StatusCode::BAD_GATEWAY,
            Self::LlmError | Self::DatabaseError | Self::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn metric(self) -> &'static str {
        match self {
            Self::InvalidRequest
            | Self::InvalidSpread
            | Self::InvalidCards
            | Self::MissingRequiredFields => ERROR_VALIDATION,
            Self::QuotaExceeded => ERROR_QUOTA,
            Self::NotFound => ERROR_NOT_FOUND,
            Self::LlmError => ERROR_LLM,
            Self::DatabaseError | Self::InternalError => ERROR_STORE,
            Self::BackendError => ERROR_BILLING,
        }
    }
}

/// An error returned to API clients.
///
/// Rendered as `{"success": false, "error": {"code", "message", "details"?}}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: code.status(),
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: ErrorCode,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: ErrorBody<'a>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        record_error(self.code.metric());
        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code,
                message: &self.message,
                details: self.details.as_ref(),
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "store error");
        match err {
            StoreError::NotFound => Self::not_found("record not found"),
            other => Self::new(ErrorCode::DatabaseError, "storage is unavailable")
                .with_details(Value::String(other.to_string())),
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        tracing::warn!(error = %err, "llm error");
        Self::new(ErrorCode::LlmError, "the reading could not be generated")
            .with_details(Value::String(err.to_string()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid(rejection.body_text())
    }
}

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Wrap `data` in the success envelope.
pub fn success<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_statuses() {
        assert_eq!(ErrorCode::InvalidCards.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::QuotaExceeded.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::BackendError.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorCode::LlmError.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn codes_serialize_screaming_snake() {
        let json = serde_json::to_value(ErrorCode::MissingRequiredFields).unwrap();
        assert_eq!(json, "MISSING_REQUIRED_FIELDS");
        assert_eq!(serde_json::to_value(ErrorCode::LlmError).unwrap(), "LLM_ERROR");
    }

    #[test]
    fn store_not_found_becomes_404() {
        let err = ApiError::from(StoreError::NotFound);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        let err = ApiError::from(StoreError::Backend("down".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn override_status_keeps_code() {
        let err = ApiError::new(ErrorCode::BackendError, "nope").with_status(StatusCode::UNAUTHORIZED);
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, ErrorCode::BackendError);
    }
}
