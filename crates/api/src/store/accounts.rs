//! Account records and their store front.

use brightspoke_core::{AccountId, Email, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, StoreError};

/// A stored account. `password_hash` is the argon2 PHC string; it is part
/// of the persisted record but must never reach a client — response types
/// own that stripping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub email: Email,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to create an account except the store-assigned parts.
#[derive(Debug, Clone)]
pub struct NewAccountRecord {
    pub email: Email,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Typed front over the accounts collection.
pub struct AccountStore<'a> {
    collection: &'a Collection<Account>,
}

impl<'a> AccountStore<'a> {
    pub(super) fn new(collection: &'a Collection<Account>) -> Self {
        Self { collection }
    }

    /// Insert a new account. Email uniqueness is enforced atomically with
    /// the insert itself.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email is already registered,
    /// or a persistence error if the write fails.
    pub async fn create(&self, record: NewAccountRecord) -> Result<Account, StoreError> {
        let NewAccountRecord {
            email,
            username,
            password_hash,
            first_name,
            last_name,
            role,
        } = record;

        let probe = email.clone();
        self.collection
            .insert_unique_with(
                move |existing| existing.email == probe,
                "email already registered",
                move |id| Account {
                    id: AccountId::new(id),
                    email,
                    username,
                    password_hash,
                    first_name,
                    last_name,
                    role,
                    created_at: Utc::now(),
                },
            )
            .await
    }

    /// Look up an account by exact email.
    pub async fn find_by_email(&self, email: &Email) -> Option<Account> {
        self.collection.find(|a| a.email == *email).await
    }

    /// Look up an account by id.
    pub async fn find_by_id(&self, id: AccountId) -> Option<Account> {
        self.collection.find(|a| a.id == id).await
    }

    /// Delete an account. Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the write fails; the record stays put
    /// in that case.
    pub async fn remove(&self, id: AccountId) -> Result<bool, StoreError> {
        let removed = self.collection.remove_where(|a| a.id == id).await?;
        Ok(removed > 0)
    }

    /// Number of stored accounts.
    pub async fn count(&self) -> usize {
        self.collection.count().await
    }
}
