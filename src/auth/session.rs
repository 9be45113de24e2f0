//! Session register: at most one live refresh token per user.
//!
//! Only a SHA-256 fingerprint of the refresh token reaches the session store,
//! so a leaked store cannot be replayed against the refresh endpoint.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::domain::UserId;
use crate::errors::Error;
use crate::storage::{SessionRepository, SessionStatus};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session registered")]
    NotFound,
    #[error("presented token is not the registered session")]
    Mismatch,
    #[error(transparent)]
    Storage(#[from] Error),
}

/// Hex-encoded SHA-256 digest of a refresh token.
pub fn fingerprint(refresh_token: &str) -> String {
    hex::encode(Sha256::digest(refresh_token.as_bytes()))
}

#[derive(Clone)]
pub struct SessionRegister {
    repository: Arc<dyn SessionRepository>,
}

impl SessionRegister {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Make `refresh_token` the user's only session.
    pub async fn save(&self, user_id: &UserId, refresh_token: &str) -> Result<(), SessionError> {
        self.repository.save(user_id, &fingerprint(refresh_token)).await?;
        Ok(())
    }

    pub async fn check(&self, user_id: &UserId, refresh_token: &str) -> Result<(), SessionError> {
        let status = self.repository.check(user_id, &fingerprint(refresh_token)).await?;
        into_result(status)
    }

    /// Drop the user's session. Succeeds when none exists.
    pub async fn delete(&self, user_id: &UserId) -> Result<(), SessionError> {
        self.repository.delete(user_id).await?;
        Ok(())
    }

    /// Drop the session only if `refresh_token` is still the registered one.
    pub async fn revoke(&self, user_id: &UserId, refresh_token: &str) -> Result<bool, SessionError> {
        let removed = self.repository.delete_if_current(user_id, &fingerprint(refresh_token)).await?;
        debug!(removed, "conditional session revocation");
        Ok(removed)
    }

    /// Replace `current` with `next` atomically. Of two rotations racing on the
    /// same token, exactly one succeeds.
    pub async fn rotate(
        &self,
        user_id: &UserId,
        current: &str,
        next: &str,
    ) -> Result<(), SessionError> {
        let status = self
            .repository
            .replace_if_current(user_id, &fingerprint(current), &fingerprint(next))
            .await?;
        into_result(status)
    }
}

fn into_result(status: SessionStatus) -> Result<(), SessionError> {
    match status {
        SessionStatus::Current => Ok(()),
        SessionStatus::Missing => Err(SessionError::NotFound),
        SessionStatus::Superseded => Err(SessionError::Mismatch),
    }
}
