//! Document store: one JSON file per collection under a data directory.

mod accounts;
mod carts;
mod collection;
mod customers;

use std::path::{Path, PathBuf};

pub use accounts::{Account, AccountStore, NewAccountRecord};
pub use carts::{Cart, CartItem, CartStore};
pub use collection::Collection;
pub use customers::{CustomerProfile, CustomerStore, NewCustomerRecord};

/// Errors surfaced by the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A requested record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A collection file exists but does not hold what it should.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A collection's id counter reached its maximum.
    #[error("id space exhausted for collection {collection}")]
    IdsExhausted { collection: &'static str },

    /// The backing files cannot be read or written.
    #[error("store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
}

/// Handle to the three collections backing the storefront.
///
/// Cheap to share behind an `Arc`; each collection serializes its own
/// writes independently.
pub struct DocumentStore {
    dir: PathBuf,
    accounts: Collection<Account>,
    customers: Collection<CustomerProfile>,
    carts: Collection<Cart>,
}

impl DocumentStore {
    /// Open (or create) the store under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or an existing
    /// collection file is unreadable or corrupt.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        Ok(Self {
            accounts: Collection::open(&dir, "accounts").await?,
            customers: Collection::open(&dir, "customers").await?,
            carts: Collection::open(&dir, "carts").await?,
            dir,
        })
    }

    /// Directory holding the collection files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Account records.
    #[must_use]
    pub fn accounts(&self) -> AccountStore<'_> {
        AccountStore::new(&self.accounts)
    }

    /// Customer profile records.
    #[must_use]
    pub fn customers(&self) -> CustomerStore<'_> {
        CustomerStore::new(&self.customers)
    }

    /// Cart records.
    #[must_use]
    pub fn carts(&self) -> CartStore<'_> {
        CartStore::new(&self.carts)
    }

    /// Verify the data directory is still writable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if a probe file cannot be written.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let probe = self.dir.join(".ping");
        tokio::fs::write(&probe, b"ok").await?;
        tokio::fs::remove_file(&probe).await?;
        Ok(())
    }

    /// Write every collection to disk, materializing files for collections
    /// that have never been written.
    ///
    /// # Errors
    ///
    /// Returns the first persist failure.
    pub async fn flush_all(&self) -> Result<(), StoreError> {
        self.accounts.flush().await?;
        self.customers.flush().await?;
        self.carts.flush().await?;
        Ok(())
    }
}
