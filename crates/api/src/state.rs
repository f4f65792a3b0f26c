//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::services::sessions::SessionIssuer;
use crate::store::{DocumentStore, StoreError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the document store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: DocumentStore,
    sessions: SessionIssuer,
}

impl AppState {
    /// Create a new application state, opening the document store under
    /// the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the document store cannot be opened.
    pub async fn new(config: ApiConfig) -> Result<Self, StoreError> {
        let store = DocumentStore::open(&config.data_dir).await?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                sessions: SessionIssuer::new(),
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.inner.store
    }

    /// Get a reference to the session issuer.
    #[must_use]
    pub fn sessions(&self) -> &SessionIssuer {
        &self.inner.sessions
    }
}
