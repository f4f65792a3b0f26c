//! Command implementations.

pub mod account;
pub mod store;

use thiserror::Error;

use brightspoke_api::config::ConfigError;
use brightspoke_api::services::auth::AuthError;
use brightspoke_api::store::StoreError;

/// Errors shared by the operator commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid role '{0}': expected customer or admin")]
    InvalidRole(String),
}
