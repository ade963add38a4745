//! Session lifecycle orchestration.
//!
//! `SessionService` owns the flows between credential verification, token
//! issuance, and the credential store: register, login, refresh (with
//! rotation), logout, and the account self-service operations. Handlers stay
//! thin; everything here is reachable from tests without an HTTP harness.

use tokio::task;
use uuid::Uuid;

use super::error::AuthFlowError;
use super::password;
use super::store::{AccountUpdate, CredentialStore, NewUser, UserRecord};
use super::tokens::{TokenCodec, TokenKind};
use super::utils::{normalize_identifier, valid_email, valid_username};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Access + refresh token pair issued by login and refresh.
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Raw registration input before normalization and hashing.
#[derive(Debug)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

pub struct SessionService<'a> {
    store: &'a dyn CredentialStore,
    codec: &'a TokenCodec,
}

impl<'a> SessionService<'a> {
    #[must_use]
    pub fn new(store: &'a dyn CredentialStore, codec: &'a TokenCodec) -> Self {
        Self { store, codec }
    }

    /// Create a new account.
    ///
    /// # Errors
    /// `Validation` for empty or malformed fields, `Conflict` when the
    /// username or email is already taken.
    pub async fn register(&self, account: NewAccount) -> Result<UserRecord, AuthFlowError> {
        if account.username.trim().is_empty()
            || account.email.trim().is_empty()
            || account.password.is_empty()
            || account.full_name.trim().is_empty()
        {
            return Err(AuthFlowError::Validation(
                "All the fields are required".to_string(),
            ));
        }

        let username = normalize_identifier(&account.username);
        let email = normalize_identifier(&account.email);

        if !valid_username(&username) {
            return Err(AuthFlowError::Validation("Invalid username".to_string()));
        }
        if !valid_email(&email) {
            return Err(AuthFlowError::Validation("Invalid email".to_string()));
        }
        if account.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthFlowError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let password_hash = hash_blocking(account.password).await?;

        let user = self
            .store
            .insert_user(NewUser {
                username,
                email,
                full_name: account.full_name.trim().to_string(),
                password_hash,
            })
            .await?;

        Ok(user)
    }

    /// Verify credentials and open a session.
    ///
    /// The identifier matches either username or email. Unknown users and
    /// wrong passwords produce the same `InvalidCredentials` error so the
    /// response cannot be used to enumerate accounts. On success the new
    /// refresh token overwrites whatever was stored before (single active
    /// session per user).
    ///
    /// # Errors
    /// `Validation` on empty input, `InvalidCredentials` on any failed check.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<(UserRecord, TokenPair), AuthFlowError> {
        let identifier = normalize_identifier(identifier);
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthFlowError::Validation(
                "Username or email and password are required".to_string(),
            ));
        }

        let Some(mut user) = self.store.find_by_login(&identifier).await? else {
            return Err(AuthFlowError::InvalidCredentials);
        };

        if !verify_blocking(user.password_hash.clone(), password.to_string()).await? {
            return Err(AuthFlowError::InvalidCredentials);
        }

        let pair = self.issue_pair(user.id)?;
        self.store
            .set_refresh_token(user.id, Some(&pair.refresh_token))
            .await?;
        user.refresh_token = Some(pair.refresh_token.clone());

        Ok((user, pair))
    }

    /// Rotate a refresh token into a fresh token pair.
    ///
    /// The presented token must verify cryptographically AND byte-for-byte
    /// equal the stored slot. The swap itself is a compare-and-swap, so of
    /// two concurrent calls with the same stale token exactly one wins; the
    /// other observes the rotated slot and fails.
    ///
    /// # Errors
    /// `SessionExpired` for every failure mode the client can trigger:
    /// expired/invalid token, unknown subject, cleared slot, mismatch, or a
    /// lost rotation race. Clients must log in again.
    pub async fn refresh(&self, presented: &str) -> Result<TokenPair, AuthFlowError> {
        let subject = self
            .codec
            .verify(presented, TokenKind::Refresh)
            .map_err(|_| AuthFlowError::SessionExpired)?;

        let Some(user) = self.store.find_by_id(subject).await? else {
            return Err(AuthFlowError::SessionExpired);
        };

        let Some(stored) = user.refresh_token.as_deref() else {
            return Err(AuthFlowError::SessionExpired);
        };
        if stored != presented {
            return Err(AuthFlowError::SessionExpired);
        }

        let pair = self.issue_pair(user.id)?;
        let rotated = self
            .store
            .rotate_refresh_token(user.id, presented, &pair.refresh_token)
            .await?;
        if !rotated {
            return Err(AuthFlowError::SessionExpired);
        }

        Ok(pair)
    }

    /// Clear the refresh-token slot. Idempotent; logging out twice is fine.
    ///
    /// # Errors
    /// Only on store failures.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AuthFlowError> {
        self.store.set_refresh_token(user_id, None).await?;
        Ok(())
    }

    /// Replace the password after verifying the old one.
    ///
    /// The stored refresh token is intentionally left in place, mirroring the
    /// platform's existing behavior.
    ///
    /// # Errors
    /// `Validation` on empty/short input, `NotFound` for an unknown id,
    /// `InvalidCredentials` when the old password fails verification.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthFlowError> {
        if old_password.is_empty() || new_password.is_empty() {
            return Err(AuthFlowError::Validation(
                "Old and new passwords are required".to_string(),
            ));
        }
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthFlowError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let Some(user) = self.store.find_by_id(user_id).await? else {
            return Err(AuthFlowError::NotFound("User is not present with this id"));
        };

        if !verify_blocking(user.password_hash.clone(), old_password.to_string()).await? {
            return Err(AuthFlowError::InvalidCredentials);
        }

        let password_hash = hash_blocking(new_password.to_string()).await?;
        self.store
            .set_password_hash(user_id, &password_hash)
            .await?;

        Ok(())
    }

    /// Fetch the caller's own record.
    ///
    /// # Errors
    /// `NotFound` when the id no longer resolves.
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserRecord, AuthFlowError> {
        match self.store.find_by_id(user_id).await? {
            Some(user) => Ok(user),
            None => Err(AuthFlowError::NotFound("User is not present with this id")),
        }
    }

    /// Update the allow-listed account fields (username, email).
    ///
    /// # Errors
    /// `Validation` on malformed input, `Conflict` on a taken username or
    /// email, `NotFound` for an unknown id.
    pub async fn update_account(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
    ) -> Result<UserRecord, AuthFlowError> {
        let username = normalize_identifier(username);
        let email = normalize_identifier(email);

        if !valid_username(&username) {
            return Err(AuthFlowError::Validation("Invalid username".to_string()));
        }
        if !valid_email(&email) {
            return Err(AuthFlowError::Validation("Invalid email".to_string()));
        }

        match self
            .store
            .update_account(user_id, AccountUpdate { username, email })
            .await?
        {
            Some(user) => Ok(user),
            None => Err(AuthFlowError::NotFound("User is not present with this id")),
        }
    }

    fn issue_pair(&self, subject: Uuid) -> Result<TokenPair, AuthFlowError> {
        let access_token = self.codec.issue_access(subject)?;
        let refresh_token = self.codec.issue_refresh(subject)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

/// Argon2 hashing is CPU-bound; keep it off the async workers.
async fn hash_blocking(password: String) -> Result<String, AuthFlowError> {
    task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|err| AuthFlowError::Internal(anyhow::Error::new(err)))?
        .map_err(AuthFlowError::Internal)
}

async fn verify_blocking(hash: String, password: String) -> Result<bool, AuthFlowError> {
    task::spawn_blocking(move || password::verify_password(&hash, &password))
        .await
        .map_err(|err| AuthFlowError::Internal(anyhow::Error::new(err)))
}

// Service-level behavior is covered in `super::tests` against the in-memory
// store, including the concurrent-rotation property.
