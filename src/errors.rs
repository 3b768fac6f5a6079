use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use tracing::error;
use utoipa::ToSchema;

/// Machine-readable codes for the not-found and conflict cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    AccountNotFound,
    AccountAlreadyExists,
    AccountIsInUse,
    TransactionNotFound,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ErrorCode::AccountAlreadyExists => "ACCOUNT_ALREADY_EXISTS",
            ErrorCode::AccountIsInUse => "ACCOUNT_IS_IN_USE",
            ErrorCode::TransactionNotFound => "TRANSACTION_NOT_FOUND",
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    Unauthorized(String),
    NotFound(ErrorCode, String),
    Conflict(ErrorCode, String),
    InternalError(String),
}

impl AppError {
    pub fn account_not_found() -> Self {
        AppError::NotFound(ErrorCode::AccountNotFound, "Account not found".to_string())
    }

    pub fn account_already_exists() -> Self {
        AppError::Conflict(
            ErrorCode::AccountAlreadyExists,
            "An account with this id already exists".to_string(),
        )
    }

    pub fn account_in_use() -> Self {
        AppError::Conflict(
            ErrorCode::AccountIsInUse,
            "Account is referenced by one or more transactions".to_string(),
        )
    }

    pub fn transaction_not_found() -> Self {
        AppError::NotFound(
            ErrorCode::TransactionNotFound,
            "Transaction not found".to_string(),
        )
    }

    /// Machine-readable code reported to the caller.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(code, _) | AppError::Conflict(code, _) => code.as_str(),
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

/// Standard error response format
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code (e.g., "VALIDATION_ERROR", "ACCOUNT_IS_IN_USE")
    #[schema(example = "VALIDATION_ERROR")]
    pub error: String,
    /// Human-readable error message
    #[schema(example = "amount should be non-zero")]
    pub message: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::NotFound(code, msg) => write!(f, "Not found ({}): {msg}", code.as_str()),
            AppError::Conflict(code, msg) => write!(f, "Conflict ({}): {msg}", code.as_str()),
            AppError::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Conflict(..) => StatusCode::CONFLICT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::ValidationError(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(_, msg)
            | AppError::Conflict(_, msg) => msg.clone(),
            AppError::InternalError(msg) => {
                // Log the actual error for debugging, but don't expose to client
                error!("Internal error: {msg}");
                "An internal error occurred".to_string()
            }
        };

        let mut builder = HttpResponse::build(self.status_code());
        if let AppError::Unauthorized(_) = self {
            builder.insert_header(("WWW-Authenticate", "Basic realm=\"ledgerkeep\""));
        }
        builder.json(ErrorResponse {
            error: self.code().to_string(),
            message,
        })
    }
}

// Convenience conversion from sqlx::Error
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_conflict_reports_specific_code() {
        let response = AppError::account_in_use().error_response();
        assert_eq!(response.status(), 409);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "ACCOUNT_IS_IN_USE");
    }

    #[actix_rt::test]
    async fn test_internal_error_is_opaque() {
        let response = AppError::InternalError("pool timed out".to_string()).error_response();
        assert_eq!(response.status(), 500);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "INTERNAL_ERROR");
        assert!(!json["message"].as_str().unwrap().contains("pool"));
    }

    #[test]
    fn test_not_found_codes() {
        assert_eq!(AppError::account_not_found().code(), "ACCOUNT_NOT_FOUND");
        assert_eq!(
            AppError::transaction_not_found().code(),
            "TRANSACTION_NOT_FOUND"
        );
        assert_eq!(
            AppError::account_already_exists().code(),
            "ACCOUNT_ALREADY_EXISTS"
        );
    }
}
