//! Request/response types for the account and session endpoints.
//!
//! Every response body is wrapped in [`ApiEnvelope`], the platform-wide JSON
//! shape `{statusCode, data, message, success}` shared with the other
//! clipstream services.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::store::UserRecord;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
    pub success: bool,
}

impl<T> ApiEnvelope<T> {
    #[must_use]
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            data: Some(data),
            message: message.into(),
            success: true,
        }
    }

    #[must_use]
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data: None,
            message: message.into(),
            success: false,
        }
    }
}

/// Public view of a user record; never carries the password hash or the
/// stored refresh token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Login accepts the username, the email, or both; whichever is present is
/// used as the lookup identifier.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Token pair returned by the refresh endpoint (also set as cookies).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn envelope_uses_camel_case_fields() -> Result<()> {
        let envelope = ApiEnvelope::ok(
            TokenPairResponse {
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
            },
            "Refreshed the user login",
        );
        let value = serde_json::to_value(&envelope)?;
        assert_eq!(
            value
                .get("statusCode")
                .and_then(serde_json::Value::as_u64),
            Some(200)
        );
        assert_eq!(value.get("success").and_then(serde_json::Value::as_bool), Some(true));
        let data = value.get("data").context("missing data")?;
        assert_eq!(
            data.get("accessToken").and_then(serde_json::Value::as_str),
            Some("a")
        );
        assert_eq!(
            data.get("refreshToken").and_then(serde_json::Value::as_str),
            Some("r")
        );
        Ok(())
    }

    #[test]
    fn failure_envelope_has_no_data() -> Result<()> {
        let envelope = ApiEnvelope::<()>::failure(StatusCode::UNAUTHORIZED, "Unauthorized request");
        let value = serde_json::to_value(&envelope)?;
        assert_eq!(
            value
                .get("statusCode")
                .and_then(serde_json::Value::as_u64),
            Some(401)
        );
        assert_eq!(
            value.get("success").and_then(serde_json::Value::as_bool),
            Some(false)
        );
        assert!(value.get("data").is_some_and(serde_json::Value::is_null));
        Ok(())
    }

    #[test]
    fn user_response_hides_credentials() -> Result<()> {
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            full_name: "Alice Example".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            refresh_token: Some("refresh".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(UserResponse::from(&record))?;
        assert_eq!(
            value.get("username").and_then(serde_json::Value::as_str),
            Some("alice")
        );
        assert_eq!(
            value.get("fullName").and_then(serde_json::Value::as_str),
            Some("Alice Example")
        );
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("refreshToken").is_none());
        Ok(())
    }

    #[test]
    fn login_request_round_trips() -> Result<()> {
        let request: LoginRequest =
            serde_json::from_value(serde_json::json!({"username": "alice", "password": "pw"}))?;
        assert_eq!(request.username.as_deref(), Some("alice"));
        assert_eq!(request.email, None);
        assert_eq!(request.password, "pw");
        Ok(())
    }
}
