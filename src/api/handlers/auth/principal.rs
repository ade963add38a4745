//! Authenticated principal extraction.
//!
//! Flow Overview: read the access-token cookie, verify it, resolve the
//! subject to a live user record, and return a principal that downstream
//! handlers can use. This gate fronts every protected route.

use tracing::error;

use super::error::AuthFlowError;
use super::session::ACCESS_TOKEN_COOKIE;
use super::store::CredentialStore;
use super::tokens::{TokenCodec, TokenKind};
use super::utils::extract_cookie;
use axum::http::HeaderMap;

/// Authenticated user context derived from the access-token cookie.
#[derive(Debug)]
pub struct Principal {
    pub user: super::store::UserRecord,
}

/// Resolve the access-token cookie into a principal.
///
/// A missing cookie, any verification failure (expired, invalid, malformed),
/// and a vanished user all collapse into `Unauthorized`; callers cannot tell
/// which check failed and must use the refresh flow.
///
/// # Errors
/// `Unauthorized` on every client-triggerable failure, `Internal` only when
/// the store itself fails.
pub async fn require_auth(
    headers: &HeaderMap,
    store: &dyn CredentialStore,
    codec: &TokenCodec,
) -> Result<Principal, AuthFlowError> {
    let Some(token) = extract_cookie(headers, ACCESS_TOKEN_COOKIE) else {
        return Err(AuthFlowError::Unauthorized);
    };

    let subject = codec
        .verify(&token, TokenKind::Access)
        .map_err(|_| AuthFlowError::Unauthorized)?;

    match store.find_by_id(subject).await {
        Ok(Some(user)) => Ok(Principal { user }),
        Ok(None) => Err(AuthFlowError::Unauthorized),
        Err(err) => {
            error!("Failed to resolve principal: {err}");
            Err(AuthFlowError::Internal(anyhow::Error::new(err)))
        }
    }
}
