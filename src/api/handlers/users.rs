//! Account self-service endpoints.
//!
//! Flow Overview:
//! 1) Authorize via the access-token cookie (except registration).
//! 2) Run the matching session-service operation.
//! 3) Wrap the result in the platform envelope.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::auth::{
    error::AuthFlowError,
    principal::require_auth,
    service::{NewAccount, SessionService},
    state::AuthState,
    storage::PgCredentialStore,
    types::{
        ApiEnvelope, RegisterRequest, UpdateAccountRequest, UpdatePasswordRequest, UserResponse,
    },
};

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = ApiEnvelope<UserResponse>),
        (status = 400, description = "Missing or malformed fields", body = ApiEnvelope<UserResponse>),
        (status = 409, description = "Username or email already taken", body = ApiEnvelope<UserResponse>)
    ),
    tag = "users"
)]
pub async fn register(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return AuthFlowError::Validation("Missing payload".to_string()).into_response();
        }
    };

    let store = PgCredentialStore::new(pool.0.clone());
    let service = SessionService::new(&store, auth_state.codec());

    match service
        .register(NewAccount {
            username: request.username,
            email: request.email,
            password: request.password,
            full_name: request.full_name,
        })
        .await
    {
        Ok(user) => (
            StatusCode::OK,
            Json(ApiEnvelope::ok(
                UserResponse::from(&user),
                "User registered successfully",
            )),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/current-user",
    responses(
        (status = 200, description = "The authenticated user", body = ApiEnvelope<UserResponse>),
        (status = 401, description = "Missing or invalid access token", body = ApiEnvelope<UserResponse>)
    ),
    tag = "users"
)]
pub async fn current_user(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let store = PgCredentialStore::new(pool.0.clone());

    match require_auth(&headers, &store, auth_state.codec()).await {
        Ok(principal) => (
            StatusCode::OK,
            Json(ApiEnvelope::ok(
                UserResponse::from(&principal.user),
                "This is the current user",
            )),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/update-account",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiEnvelope<UserResponse>),
        (status = 400, description = "Missing or malformed fields", body = ApiEnvelope<UserResponse>),
        (status = 401, description = "Missing or invalid access token", body = ApiEnvelope<UserResponse>),
        (status = 409, description = "Username or email already taken", body = ApiEnvelope<UserResponse>)
    ),
    tag = "users"
)]
pub async fn update_account(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<UpdateAccountRequest>>,
) -> impl IntoResponse {
    let store = PgCredentialStore::new(pool.0.clone());

    let principal = match require_auth(&headers, &store, auth_state.codec()).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };

    let request: UpdateAccountRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return AuthFlowError::Validation("Missing payload".to_string()).into_response();
        }
    };

    let service = SessionService::new(&store, auth_state.codec());
    match service
        .update_account(principal.user.id, &request.username, &request.email)
        .await
    {
        Ok(user) => (
            StatusCode::OK,
            Json(ApiEnvelope::ok(
                UserResponse::from(&user),
                "Account updated successfully",
            )),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/update-password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = ApiEnvelope<UserResponse>),
        (status = 400, description = "Missing or malformed fields", body = ApiEnvelope<UserResponse>),
        (status = 401, description = "Wrong old password or invalid access token", body = ApiEnvelope<UserResponse>)
    ),
    tag = "users"
)]
pub async fn update_password(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<UpdatePasswordRequest>>,
) -> impl IntoResponse {
    let store = PgCredentialStore::new(pool.0.clone());

    let principal = match require_auth(&headers, &store, auth_state.codec()).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };

    let request: UpdatePasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return AuthFlowError::Validation("Missing payload".to_string()).into_response();
        }
    };

    let service = SessionService::new(&store, auth_state.codec());
    match service
        .change_password(
            principal.user.id,
            &request.old_password,
            &request.new_password,
        )
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiEnvelope::<()>::ok((), "Password updated successfully")),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}
