//! Signed session tokens (access + refresh).
//!
//! Both kinds are JWTs carrying the user id as `sub`. They differ only in
//! signing secret and lifetime, so a leaked access token can never pass as a
//! refresh token. Verification is pure: no store access happens here.

use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign {kind} token")]
    Signing {
        kind: &'static str,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
    #[error("token is structurally invalid")]
    Malformed,
    #[error("token signature is invalid")]
    Invalid,
    #[error("token is expired")]
    Expired,
}

/// Signed payload carried by both token kinds.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    jti: String,
    iat: i64,
    exp: i64,
}

struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenKeys {
    fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_seconds,
        }
    }
}

/// Issues and verifies the two session token kinds.
pub struct TokenCodec {
    access: TokenKeys,
    refresh: TokenKeys,
}

impl TokenCodec {
    #[must_use]
    pub fn new(
        access_secret: &SecretString,
        refresh_secret: &SecretString,
        access_ttl_seconds: i64,
        refresh_ttl_seconds: i64,
    ) -> Self {
        Self {
            access: TokenKeys::new(access_secret, access_ttl_seconds),
            refresh: TokenKeys::new(refresh_secret, refresh_ttl_seconds),
        }
    }

    /// Issue a short-lived access token for `subject`.
    ///
    /// # Errors
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue_access(&self, subject: Uuid) -> Result<String, TokenError> {
        self.issue(TokenKind::Access, subject)
    }

    /// Issue a refresh token for `subject`.
    ///
    /// # Errors
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue_refresh(&self, subject: Uuid) -> Result<String, TokenError> {
        self.issue(TokenKind::Refresh, subject)
    }

    fn issue(&self, kind: TokenKind, subject: Uuid) -> Result<String, TokenError> {
        let keys = self.keys(kind);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            // A fresh jti makes every issued token unique even within one second.
            jti: Ulid::new().to_string(),
            iat: now,
            exp: now + keys.ttl_seconds,
        };
        encode(&Header::default(), &claims, &keys.encoding).map_err(|source| {
            TokenError::Signing {
                kind: kind.as_str(),
                source,
            }
        })
    }

    /// Verify a token of the given kind and return its subject.
    ///
    /// # Errors
    /// [`TokenError::Expired`] past expiry, [`TokenError::Invalid`] on a bad
    /// signature (including a token of the other kind), and
    /// [`TokenError::Malformed`] when the input is not a token at all.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Uuid, TokenError> {
        let keys = self.keys(kind);
        let data = decode::<Claims>(token, &keys.decoding, &Validation::default())
            .map_err(classify_error)?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Malformed)
    }

    fn keys(&self, kind: TokenKind) -> &TokenKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

fn classify_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => TokenError::Malformed,
        _ => TokenError::Invalid,
    }
}
