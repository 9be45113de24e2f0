//! # Gatehouse
//!
//! Authentication and session lifecycle core: password verification, signed
//! access/refresh token pairs, single-session refresh-token rotation and
//! role-based authorization.
//!
//! ## Architecture
//!
//! ```text
//!                      AuthService
//!       ┌───────────┬──────┴──────┬──────────────┐
//! CredentialVerifier TokenIssuer SessionRegister AuthorizationGate
//!                                     ↓               ↓
//!              UserRepository  SessionRepository  RoleRepository
//! ```
//!
//! Storage is reached through the traits in [`storage`]; in-memory
//! implementations ship with the crate.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gatehouse::auth::{AuthService, LoginRequest, OperationContext, RegisterRequest};
//! use gatehouse::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     gatehouse::observability::init_observability(&config)?;
//!
//!     let service = AuthService::in_memory(&config.auth)?;
//!     let ctx = OperationContext::new();
//!     service
//!         .register(&ctx, RegisterRequest::new("a@x.com", "p").with_roles(["regular"]))
//!         .await?;
//!     let tokens = service.login(&ctx, LoginRequest::new("a@x.com", "p")).await?;
//!     println!("{}", tokens.access_token);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;

// Re-export commonly used types and traits
pub use auth::{AuthError, AuthService, OperationContext};
pub use config::{AppConfig, AuthConfig, Environment};
pub use errors::{Error, Result};
pub use observability::init_observability;

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
