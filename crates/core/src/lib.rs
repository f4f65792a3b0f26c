//! Brightspoke Core - Shared domain types.
//!
//! This crate provides common types used across all Brightspoke components:
//! - `api` - The storefront backend (accounts, auth, provisioning)
//! - `cli` - Command-line tools for store management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
