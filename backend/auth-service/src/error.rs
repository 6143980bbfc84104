use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use token_core::{InsufficientRole, TokenError};

/// Externally visible failure surface of the HTTP API.
///
/// Token rejections arrive here already collapsed: the precise internal kind
/// (expired vs forged vs revoked vs wrong type) is logged but never exposed,
/// so a caller cannot distinguish them by probing. `ServiceUnavailable`
/// stays separate — an outage is never presented as an authorization verdict.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden")]
    Forbidden,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Weak password")]
    WeakPassword,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service temporarily unavailable")]
    ServiceUnavailable,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Unauthenticated".to_string())
            }
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::AccountInactive => {
                (StatusCode::FORBIDDEN, "Account is inactive".to_string())
            }
            ApiError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Email already registered".to_string())
            }
            ApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            ApiError::WeakPassword => (
                StatusCode::BAD_REQUEST,
                "Password does not meet strength requirements".to_string(),
            ),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable".to_string(),
            ),
            ApiError::Database(_) | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::StoreUnavailable(reason) => {
                tracing::error!(%reason, "revocation store unavailable");
                ApiError::ServiceUnavailable
            }
            TokenError::Signing(reason) => ApiError::Internal(reason),
            // Collapse every rejection kind; keep the detail in the logs.
            rejection => {
                tracing::warn!(kind = %rejection, "token rejected");
                ApiError::Unauthenticated
            }
        }
    }
}

impl From<InsufficientRole> for ApiError {
    fn from(err: InsufficientRole) -> Self {
        tracing::warn!(required = %err.required, granted = %err.granted, "role gate rejected");
        ApiError::Forbidden
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use token_core::TokenType;

    #[test]
    fn token_rejections_collapse_to_unauthenticated() {
        for err in [
            TokenError::Malformed,
            TokenError::InvalidSignature,
            TokenError::Expired,
            TokenError::Revoked,
            TokenError::WrongType {
                expected: TokenType::Access,
                actual: TokenType::Refresh,
            },
        ] {
            assert!(matches!(ApiError::from(err), ApiError::Unauthenticated));
        }
    }

    #[test]
    fn store_outage_stays_distinct_from_rejection() {
        let err = ApiError::from(TokenError::StoreUnavailable("timeout".into()));
        assert!(matches!(err, ApiError::ServiceUnavailable));
    }
}
