//! Business logic on top of the document store.

pub mod auth;
pub mod sessions;
