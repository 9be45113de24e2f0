//! Domain layer
//!
//! Plain identifier types shared by the auth services and the storage traits.
//! Nothing here depends on a store or on the token format.

pub mod id;

pub use id::{TokenId, UserId};
