use axum::extract::rejection::JsonRejection;
use axum::http::header::{RETRY_AFTER, WWW_AUTHENTICATE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Admission Errors
///
/// `Unauthorized` and `RateLimitExceeded` are produced by the admission chain
/// before any handler runs. Their messages are caller-facing and returned as-is.
///
/// # Service Errors
///
/// `ServiceFailure` carries the internal cause for logging only. The caller sees
/// a fixed per-service message such as `"Translation failed"`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitExceeded {
        /// Seconds until the client may retry
        retry_after_secs: u64,
        /// Configured request threshold per window (0 when not applicable)
        limit: u32,
    },

    #[error("{public_message}: {cause}")]
    ServiceFailure {
        /// Caller-facing message, e.g. "Translation failed"
        public_message: &'static str,
        /// Internal cause, logged but never returned
        cause: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Operation timed out: {0}")]
    OperationTimeout(String),
}

impl AppError {
    /// Wrap an internal failure from a business service.
    pub fn service(public_message: &'static str, cause: impl ToString) -> Self {
        AppError::ServiceFailure {
            public_message,
            cause: cause.to_string(),
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::OperationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::ServiceFailure { .. } | AppError::Internal(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message that is safe to return to the caller.
    fn public_message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) | AppError::NotFound(msg) | AppError::BadRequest(msg) => {
                msg.clone()
            }
            AppError::RateLimitExceeded { .. } => "Rate limit exceeded".to_string(),
            AppError::ServiceFailure { public_message, .. } => (*public_message).to_string(),
            AppError::OperationTimeout(_) => "Operation timed out. Please try again.".to_string(),
            AppError::Internal(_) | AppError::ConfigError(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

/// Error response body: `{"error": {"code", "message", "timestamp"}}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// HTTP status code
    pub code: u16,
    pub message: String,
    pub timestamp: String,
}

impl ErrorEnvelope {
    pub fn new(status: StatusCode, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            error: ErrorBody {
                code: status.as_u16(),
                message: message.into(),
                timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Full detail stays server-side
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorEnvelope::new(status, self.public_message(), Utc::now());
        let mut response = (status, axum::Json(body)).into_response();

        let headers = response.headers_mut();
        match &self {
            AppError::Unauthorized(_) => {
                headers.insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            AppError::RateLimitExceeded {
                retry_after_secs,
                limit,
            } => {
                headers.insert(RETRY_AFTER, HeaderValue::from(*retry_after_secs));
                if *limit > 0 {
                    headers.insert("x-ratelimit-limit", HeaderValue::from(*limit));
                    headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
                }
            }
            _ => {}
        }

        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::BadRequest("Expected Content-Type: application/json".to_string())
            }
            other => AppError::BadRequest(sanitize_json_error(&other.body_text())),
        }
    }
}

/// Sanitize JSON error messages to avoid leaking internal type information.
///
/// Deserialization errors can name internal structs; only the offending field
/// name is kept.
fn sanitize_json_error(msg: &str) -> String {
    if msg.contains("missing field")
        && let Some(start) = msg.find('`')
        && let Some(end) = msg[start + 1..].find('`')
    {
        let field = &msg[start + 1..start + 1 + end];
        return format!("Missing required field: {field}");
    }

    if msg.contains("unknown field")
        && let Some(start) = msg.find('`')
        && let Some(end) = msg[start + 1..].find('`')
    {
        let field = &msg[start + 1..start + 1 + end];
        return format!("Unknown field: {field}");
    }

    if msg.contains("invalid type") {
        return "Invalid data type in request body".to_string();
    }

    if msg.contains("EOF while parsing") || msg.contains("expected") {
        return "Malformed JSON in request body".to_string();
    }

    "Invalid request format".to_string()
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
