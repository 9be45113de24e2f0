//! # Error Handling
//!
//! Crate-wide error handling. Domain outcomes of the auth operations live in
//! [`crate::auth::AuthError`]; this module covers everything underneath.

mod types;

pub use types::{GatehouseError, Result};

/// Short alias used throughout the crate
pub type Error = GatehouseError;
