//! Application error type and its HTTP representation.
//!
//! Every failure a request can hit is an [`AppError`] variant. Handlers return
//! `Result<_, AppError>` and rely on the [`IntoResponse`] impl to turn it into a
//! JSON body of the form:
//!
//! ```json
//! { "error": { "code": "invalid_url", "message": "...", "details": {} } }
//! ```
//!
//! `details` only ever carries request-derived context (the offending field or
//! value); driver messages and internal state stay in the logs.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use validator::ValidationErrors;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The submitted long URL is not an absolute http(s) URL.
    #[error("{message}")]
    InvalidUrl { message: String, details: Value },

    /// QR error-correction level or size outside the supported domain.
    #[error("{message}")]
    InvalidQrParams { message: String, details: Value },

    /// Malformed request body or query string.
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// The store already holds this short code. Retried inside the service.
    #[error("Short code already exists: {code}")]
    DuplicateCode { code: String },

    /// Every generated code collided within the retry budget.
    #[error("Could not allocate a unique short code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },

    /// The client's rate-limit bucket is empty.
    #[error("Too many requests, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timed out")]
    RequestTimeout,

    #[error("{message}")]
    StoreUnavailable { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn invalid_url(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidUrl {
            message: message.into(),
            details,
        }
    }

    pub fn invalid_qr_params(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidQrParams {
            message: message.into(),
            details,
        }
    }

    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUrl { .. } | Self::InvalidQrParams { .. } | Self::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateCode { .. } => StatusCode::CONFLICT,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::CodeSpaceExhausted { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable error kind exposed to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::InvalidQrParams { .. } => "invalid_qr_params",
            Self::Validation { .. } => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::DuplicateCode { .. } => "duplicate_code",
            Self::CodeSpaceExhausted { .. } => "code_space_exhausted",
            Self::RateLimited { .. } => "rate_limited",
            Self::RequestTimeout => "request_timeout",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::Internal { .. } => "internal_error",
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let details = match self {
            Self::InvalidUrl { details, .. }
            | Self::InvalidQrParams { details, .. }
            | Self::Validation { details, .. }
            | Self::NotFound { details, .. }
            | Self::StoreUnavailable { details, .. }
            | Self::Internal { details, .. } => details.clone(),
            Self::DuplicateCode { code } => json!({ "code": code }),
            Self::CodeSpaceExhausted { attempts } => json!({ "attempts": attempts }),
            Self::RateLimited {
                retry_after_seconds,
            } => json!({ "retry_after_seconds": retry_after_seconds }),
            Self::RequestTimeout => json!({}),
        };

        ErrorInfo {
            code: self.kind(),
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "{}", self);
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::DuplicateCode {
                code: db.constraint().unwrap_or("short_urls_pkey").to_string(),
            };
        }

        tracing::error!("Database error: {}", e);
        AppError::store_unavailable("URL store is unavailable", json!({}))
    }
}

/// Maps DTO validation failures onto the error kind of the offending field.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
        let details = json!({ "fields": fields });

        if fields.contains(&"original_url") {
            AppError::invalid_url("Invalid URL format", details)
        } else {
            AppError::bad_request("Validation failed", details)
        }
    }
}

/// Type errors on a known field keep that field's error kind, so `"qr_size": -5`
/// reports the same kind as `?size=-5`.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let reason = rejection.body_text();
        let field = match rejection {
            JsonRejection::JsonDataError(_) => rejected_field(&reason),
            _ => None,
        };
        let details = json!({ "reason": reason });

        match field {
            Some("original_url") => AppError::invalid_url("Invalid URL format", details),
            Some("qr_size" | "qr_error_correction") => {
                AppError::invalid_qr_params("Invalid QR code parameters", details)
            }
            _ => AppError::bad_request("Invalid request body", details),
        }
    }
}

/// Extracts the field path from a deserialization message of the form
/// `<prefix>: <path>: <error>`.
fn rejected_field(body_text: &str) -> Option<&str> {
    let (_, detail) = body_text.split_once(": ")?;
    let (path, _) = detail.split_once(": ")?;
    (!path.contains(' ')).then_some(path)
}

/// Query strings on the QR endpoint only carry `level` and `size`, so a
/// rejection there is always a bad QR parameter.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::invalid_qr_params(
            "Invalid QR code parameters",
            json!({ "reason": rejection.body_text() }),
        )
    }
}
