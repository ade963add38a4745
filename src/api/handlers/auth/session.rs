//! Session endpoints: login, refresh, logout.
//!
//! Tokens travel as `HttpOnly`, `Secure` cookies on login and refresh, and
//! both cookies are cleared on logout.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::{
    error::AuthFlowError,
    principal::require_auth,
    service::{SessionService, TokenPair},
    state::AuthState,
    storage::PgCredentialStore,
    types::{ApiEnvelope, LoginRequest, TokenPairResponse, UserResponse},
    utils::extract_cookie,
};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Build a secure `HttpOnly` cookie carrying one of the session tokens.
pub(super) fn session_cookie(
    name: &str,
    value: &str,
    max_age_seconds: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    format!("{name}={value}; Path=/; Max-Age={max_age_seconds}; HttpOnly; Secure; SameSite=Lax")
        .parse()
}

/// Build a cookie that removes `name` from the client immediately.
pub(super) fn clear_cookie(name: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    format!("{name}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=Lax").parse()
}

/// Set both token cookies for a freshly issued pair.
fn token_pair_cookies(
    auth_state: &AuthState,
    pair: &TokenPair,
) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        session_cookie(
            ACCESS_TOKEN_COOKIE,
            &pair.access_token,
            auth_state.config().access_token_ttl_seconds(),
        )?,
    );
    headers.append(
        SET_COOKIE,
        session_cookie(
            REFRESH_TOKEN_COOKIE,
            &pair.refresh_token,
            auth_state.config().refresh_token_ttl_seconds(),
        )?,
    );
    Ok(headers)
}

fn clear_token_cookies() -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, clear_cookie(ACCESS_TOKEN_COOKIE)?);
    headers.append(SET_COOKIE, clear_cookie(REFRESH_TOKEN_COOKIE)?);
    Ok(headers)
}

fn cookie_build_failure(err: &InvalidHeaderValue) -> axum::response::Response {
    error!("Failed to build session cookie: {err}");
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    (
        status,
        Json(ApiEnvelope::<()>::failure(status, "Internal server error")),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, token cookies set", body = ApiEnvelope<UserResponse>),
        (status = 400, description = "Missing or malformed payload", body = ApiEnvelope<UserResponse>),
        (status = 401, description = "Invalid credentials", body = ApiEnvelope<UserResponse>)
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return AuthFlowError::Validation("Missing payload".to_string()).into_response();
        }
    };

    let identifier = request
        .username
        .or(request.email)
        .unwrap_or_default();

    let store = PgCredentialStore::new(pool.0.clone());
    let service = SessionService::new(&store, auth_state.codec());

    match service.login(&identifier, &request.password).await {
        Ok((user, pair)) => match token_pair_cookies(&auth_state, &pair) {
            Ok(headers) => (
                StatusCode::OK,
                headers,
                Json(ApiEnvelope::ok(
                    UserResponse::from(&user),
                    "User logged in successfully",
                )),
            )
                .into_response(),
            Err(err) => cookie_build_failure(&err),
        },
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users/refresh",
    responses(
        (status = 200, description = "Session refreshed, rotated token cookies set", body = ApiEnvelope<TokenPairResponse>),
        (status = 401, description = "Refresh token missing, expired, or already used", body = ApiEnvelope<TokenPairResponse>)
    ),
    tag = "auth"
)]
pub async fn refresh(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let Some(presented) = extract_cookie(&headers, REFRESH_TOKEN_COOKIE) else {
        return AuthFlowError::SessionExpired.into_response();
    };

    let store = PgCredentialStore::new(pool.0.clone());
    let service = SessionService::new(&store, auth_state.codec());

    match service.refresh(&presented).await {
        Ok(pair) => match token_pair_cookies(&auth_state, &pair) {
            Ok(response_headers) => (
                StatusCode::OK,
                response_headers,
                Json(ApiEnvelope::ok(
                    TokenPairResponse {
                        access_token: pair.access_token,
                        refresh_token: pair.refresh_token,
                    },
                    "Refreshed the user login",
                )),
            )
                .into_response(),
            Err(err) => cookie_build_failure(&err),
        },
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses(
        (status = 200, description = "Session cleared, token cookies removed", body = ApiEnvelope<UserResponse>),
        (status = 401, description = "Missing or invalid access token", body = ApiEnvelope<UserResponse>)
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let store = PgCredentialStore::new(pool.0.clone());

    let principal = match require_auth(&headers, &store, auth_state.codec()).await {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };

    let service = SessionService::new(&store, auth_state.codec());
    if let Err(err) = service.logout(principal.user.id).await {
        return err.into_response();
    }

    // Always clear the cookies, even if the slot was already empty.
    match clear_token_cookies() {
        Ok(response_headers) => (
            StatusCode::OK,
            response_headers,
            Json(ApiEnvelope::<()>::ok((), "User logged out successfully")),
        )
            .into_response(),
        Err(err) => cookie_build_failure(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie(ACCESS_TOKEN_COOKIE, "tok", 900).expect("valid cookie");
        let value = cookie.to_str().expect("ascii cookie");
        assert!(value.starts_with("accessToken=tok;"));
        assert!(value.contains("Max-Age=900"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("Path=/"));
    }

    #[test]
    fn clear_cookie_removes_value() {
        let cookie = clear_cookie(REFRESH_TOKEN_COOKIE).expect("valid cookie");
        let value = cookie.to_str().expect("ascii cookie");
        assert!(value.starts_with("refreshToken=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("HttpOnly"));
    }

    #[test]
    fn pair_cookies_set_both_names() {
        use secrecy::SecretString;

        let state = AuthState::new(super::super::state::AuthConfig::new(
            SecretString::from("access-secret"),
            SecretString::from("refresh-secret"),
        ));
        let pair = TokenPair {
            access_token: "a.b.c".to_string(),
            refresh_token: "d.e.f".to_string(),
        };
        let headers = token_pair_cookies(&state, &pair).expect("cookies should build");
        let cookies: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("accessToken=a.b.c")));
        assert!(cookies.iter().any(|c| c.starts_with("refreshToken=d.e.f")));
    }
}
