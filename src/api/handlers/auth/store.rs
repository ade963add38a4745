//! Credential store contract.
//!
//! The session service talks to user records only through this trait, so the
//! core stays testable without a database. The production implementation is
//! [`super::storage::PgCredentialStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// A stored user account.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    /// The single active session slot. `None` means no refresh token is
    /// currently valid for this user.
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create an account. All values are already normalized
/// and the password already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}

/// Allow-listed account fields a user may change.
#[derive(Debug)]
pub struct AccountUpdate {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username or email already taken")]
    Conflict,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by username or email (already normalized).
    async fn find_by_login(&self, identifier: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a new account; duplicate username or email yields
    /// [`StoreError::Conflict`].
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Overwrite the refresh-token slot. `None` clears it (logout).
    /// Last write wins; no compare is performed.
    async fn set_refresh_token(
        &self,
        user_id: Uuid,
        token: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Compare-and-swap the refresh-token slot: only replaces the stored
    /// value when it still equals `current`. Returns whether the swap
    /// happened, so concurrent rotations cannot both succeed.
    async fn rotate_refresh_token(
        &self,
        user_id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, StoreError>;

    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError>;

    /// Apply an account update; duplicate username or email yields
    /// [`StoreError::Conflict`], an unknown id yields `Ok(None)`.
    async fn update_account(
        &self,
        user_id: Uuid,
        update: AccountUpdate,
    ) -> Result<Option<UserRecord>, StoreError>;
}
