//! Customer profile records and their store front.

use brightspoke_core::{AccountId, CustomerId, Email};
use serde::{Deserialize, Serialize};

use super::{Collection, StoreError};

/// A stored customer profile, linked to its account by `account_id`.
///
/// `phone` and `address` start empty; profile pages fill them in later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub id: CustomerId,
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
}

/// Everything needed to create a profile except the store-assigned id.
#[derive(Debug, Clone)]
pub struct NewCustomerRecord {
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
}

/// Typed front over the customers collection.
pub struct CustomerStore<'a> {
    collection: &'a Collection<CustomerProfile>,
}

impl<'a> CustomerStore<'a> {
    pub(super) fn new(collection: &'a Collection<CustomerProfile>) -> Self {
        Self { collection }
    }

    /// Insert a new profile with empty contact details.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the write fails.
    pub async fn create(&self, record: NewCustomerRecord) -> Result<CustomerProfile, StoreError> {
        let NewCustomerRecord {
            account_id,
            first_name,
            last_name,
            email,
        } = record;

        self.collection
            .insert_with(move |id| CustomerProfile {
                id: CustomerId::new(id),
                account_id,
                first_name,
                last_name,
                email,
                phone: String::new(),
                address: String::new(),
            })
            .await
    }

    /// Look up a profile by id.
    pub async fn find_by_id(&self, id: CustomerId) -> Option<CustomerProfile> {
        self.collection.find(|c| c.id == id).await
    }

    /// Fetch a profile by id, treating absence as an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no profile has this id.
    pub async fn get(&self, id: CustomerId) -> Result<CustomerProfile, StoreError> {
        self.find_by_id(id).await.ok_or(StoreError::NotFound("Customer"))
    }

    /// Look up the profile linked to an account.
    pub async fn find_by_account(&self, account_id: AccountId) -> Option<CustomerProfile> {
        self.collection.find(|c| c.account_id == account_id).await
    }

    /// Delete a profile. Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the write fails; the record stays put
    /// in that case.
    pub async fn remove(&self, id: CustomerId) -> Result<bool, StoreError> {
        let removed = self.collection.remove_where(|c| c.id == id).await?;
        Ok(removed > 0)
    }

    /// Number of stored profiles.
    pub async fn count(&self) -> usize {
        self.collection.count().await
    }
}
