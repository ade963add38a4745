//! Typed failure taxonomy for the session core.
//!
//! Every operation returns one of these instead of throwing through the
//! handler stack; the `IntoResponse` impl is the single place where domain
//! failures become HTTP status codes and response envelopes.

use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;
use tracing::error;

use super::store::StoreError;
use super::tokens::TokenError;
use super::types::ApiEnvelope;

#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// Missing or malformed input; the message is safe to show.
    #[error("{0}")]
    Validation(String),
    /// Unknown user or wrong password. One constant message for both so the
    /// response never reveals which check failed.
    #[error("Invalid user credentials")]
    InvalidCredentials,
    /// Refresh token missing, stale, or already rotated away.
    #[error("Refresh token is expired or already used")]
    SessionExpired,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("Unauthorized request")]
    Unauthorized,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl AuthFlowError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::SessionExpired | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Self::Token(TokenError::Signing { .. }) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Message safe to put in the response body. Token failure details stay
    /// server-side; clients only need to know the request was unauthorized.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Token(TokenError::Signing { .. }) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Token(_) => "Unauthorized request".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for AuthFlowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => {
                Self::Conflict("User already exists with this username or email".to_string())
            }
            StoreError::Backend(err) => Self::Internal(err),
        }
    }
}

impl IntoResponse for AuthFlowError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Debug formatting keeps the full source chain in the log.
            error!("auth operation failed: {self:?}");
        }
        let body = ApiEnvelope::<()>::failure(status, self.public_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            AuthFlowError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthFlowError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthFlowError::SessionExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthFlowError::Token(TokenError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthFlowError::NotFound("missing").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthFlowError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthFlowError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn credential_failure_message_is_constant() {
        // Unknown-user and wrong-password paths both construct this variant,
        // so the observable message cannot enumerate accounts.
        assert_eq!(
            AuthFlowError::InvalidCredentials.public_message(),
            "Invalid user credentials"
        );
    }

    #[test]
    fn internal_details_do_not_leak() {
        let err = AuthFlowError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(err.public_message(), "Internal server error");

        let err = AuthFlowError::Token(TokenError::Expired);
        assert_eq!(err.public_message(), "Unauthorized request");
    }

    #[test]
    fn store_conflict_maps_to_conflict() {
        let err: AuthFlowError = StoreError::Conflict.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
