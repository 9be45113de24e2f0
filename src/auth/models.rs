//! Request/response models and the error surface of the auth services.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::auth::hashing::CredentialError;
use crate::auth::jwt::TokenError;
use crate::auth::role::Role;
use crate::auth::session::SessionError;
use crate::auth::user::User;
use crate::errors::Error;

/// Payload for creating an account.
///
/// `roles` are raw names; unknown ones are skipped when the roles are stored.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl RegisterRequest {
    pub fn new<E: Into<String>, P: Into<String>>(email: E, password: P) -> Self {
        Self { email: email.into(), password: password.into(), ..Default::default() }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("last_name", &self.last_name)
            .field("first_name", &self.first_name)
            .field("middle_name", &self.middle_name)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("roles", &self.roles)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new<E: Into<String>, P: Into<String>>(email: E, password: P) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl RefreshRequest {
    pub fn new<T: Into<String>>(refresh_token: T) -> Self {
        Self { refresh_token: refresh_token.into() }
    }
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest").field("refresh_token", &"[redacted]").finish()
    }
}

/// Access token plus the roles of which the caller must hold at least one.
/// An empty role list only requires a valid token for an existing user.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    pub access_token: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl AuthenticateRequest {
    pub fn new<T: Into<String>>(access_token: T, roles: Vec<Role>) -> Self {
        Self { access_token: access_token.into(), roles }
    }
}

impl fmt::Debug for AuthenticateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticateRequest")
            .field("access_token", &"[redacted]")
            .field("roles", &self.roles)
            .finish()
    }
}

/// Access/refresh token pair handed back by register, login and refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .finish()
    }
}

/// A user together with the roles currently assigned to them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user: User,
    pub roles: Vec<Role>,
}

/// Errors surfaced by the auth services.
///
/// Storage failures stay wrapped in [`AuthError::Internal`] so callers can log
/// the cause while only the opaque message reaches end users.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already taken")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid credentials")]
    CredentialMismatch,
    #[error("insufficient permission")]
    InsufficientPermission,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("session not found")]
    SessionNotFound,
    #[error("session does not match the presented token")]
    SessionMismatch,
    #[error("operation cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("internal error")]
    Internal(#[source] Error),
}

impl AuthError {
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::Internal(_))
    }
}

impl From<Error> for AuthError {
    fn from(err: Error) -> Self {
        match err {
            Error::Cancelled { .. } => AuthError::Cancelled,
            Error::Timeout { .. } => AuthError::DeadlineExceeded,
            other => AuthError::Internal(other),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid => AuthError::TokenInvalid,
            TokenError::Encoding(source) => AuthError::Internal(Error::internal_with_source(
                "failed to sign token",
                Box::new(source),
            )),
        }
    }
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Mismatch => AuthError::CredentialMismatch,
            CredentialError::Hashing(message) => AuthError::Internal(Error::internal(message)),
        }
    }
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound => AuthError::SessionNotFound,
            SessionError::Mismatch => AuthError::SessionMismatch,
            SessionError::Storage(source) => AuthError::from(source),
        }
    }
}
