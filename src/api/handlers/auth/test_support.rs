//! In-memory credential store for exercising the session flows in tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::store::{AccountUpdate, CredentialStore, NewUser, StoreError, UserRecord};

#[derive(Default)]
pub(crate) struct MemoryCredentialStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl MemoryCredentialStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seed a user and return its record.
    pub(crate) async fn seed(&self, username: &str, email: &str, password_hash: &str) -> UserRecord {
        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Test User".to_string(),
            password_hash: password_hash.to_string(),
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().await.insert(user.id, user.clone());
        user
    }

    pub(crate) async fn stored_refresh_token(&self, user_id: Uuid) -> Option<String> {
        self.users
            .lock()
            .await
            .get(&user_id)
            .and_then(|user| user.refresh_token.clone())
    }

    pub(crate) async fn remove(&self, user_id: Uuid) {
        self.users.lock().await.remove(&user_id);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_login(&self, identifier: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().await;
        Ok(users
            .values()
            .find(|user| user.username == identifier || user.email == identifier)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.lock().await;
        if users
            .values()
            .any(|existing| existing.username == user.username || existing.email == user.email)
        {
            return Err(StoreError::Conflict);
        }
        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            password_hash: user.password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn set_refresh_token(
        &self,
        user_id: Uuid,
        token: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.get_mut(&user_id) {
            user.refresh_token = token.map(str::to_string);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, StoreError> {
        // Compare and swap under one lock acquisition, matching the row-level
        // atomicity of the SQL UPDATE.
        let mut users = self.users.lock().await;
        match users.get_mut(&user_id) {
            Some(user) if user.refresh_token.as_deref() == Some(current) => {
                user.refresh_token = Some(next.to_string());
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.get_mut(&user_id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_account(
        &self,
        user_id: Uuid,
        update: AccountUpdate,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.lock().await;
        let taken = users.values().any(|existing| {
            existing.id != user_id
                && (existing.username == update.username || existing.email == update.email)
        });
        if taken {
            return Err(StoreError::Conflict);
        }
        Ok(users.get_mut(&user_id).map(|user| {
            user.username = update.username;
            user.email = update.email;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}
