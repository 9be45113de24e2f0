//! Authentication and authorization module entry point.
//!
//! Password hashing, signed token pairs, the one-session-per-user register,
//! role checks and the [`AuthService`] that sequences them.

pub mod auth_service;
pub mod authorization;
pub mod context;
pub mod hashing;
pub mod jwt;
pub mod models;
pub mod role;
pub mod session;
pub mod user;

pub use auth_service::AuthService;
pub use authorization::AuthorizationGate;
pub use context::OperationContext;
pub use hashing::{CredentialError, CredentialVerifier};
pub use jwt::{TokenClaims, TokenError, TokenIssuer, TokenSecret};
pub use models::{
    AuthError, AuthenticateRequest, LoginRequest, Profile, RefreshRequest, RegisterRequest,
    TokenPair,
};
pub use role::Role;
pub use session::{SessionError, SessionRegister};
pub use user::{NewUser, User, UserClaims, UserLookup};
