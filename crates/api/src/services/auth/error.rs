//! Authentication and provisioning error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] brightspoke_core::EmailError),

    /// A required field is missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The email is already registered.
    #[error("email already registered")]
    EmailExists,

    /// No account matches the email.
    #[error("user not found")]
    UserNotFound,

    /// The password does not match the stored hash.
    #[error("invalid password")]
    InvalidPassword,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
