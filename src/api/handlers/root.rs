use axum::response::IntoResponse;

/// Service banner for `/`; undocumented on purpose.
pub async fn root() -> impl IntoResponse {
    crate::APP_USER_AGENT
}
