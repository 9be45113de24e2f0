//! Session repository
//!
//! One entry per user: the fingerprint of the refresh token that is currently
//! allowed to rotate. The repository never sees raw tokens.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::UserId;
use crate::errors::Result;
use crate::store_span;

/// Outcome of comparing a presented fingerprint with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The presented fingerprint is the registered one
    Current,
    /// No session is registered for the user
    Missing,
    /// A different fingerprint is registered
    Superseded,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Register `fingerprint` for the user, replacing any previous entry.
    async fn save(&self, user_id: &UserId, fingerprint: &str) -> Result<()>;

    async fn check(&self, user_id: &UserId, fingerprint: &str) -> Result<SessionStatus>;

    /// Remove the user's entry. Removing a missing entry succeeds.
    async fn delete(&self, user_id: &UserId) -> Result<()>;

    /// Remove the user's entry only while `fingerprint` is the registered one.
    async fn delete_if_current(&self, user_id: &UserId, fingerprint: &str) -> Result<bool>;

    /// Swap `current` for `next` in one step. The entry is only replaced when the
    /// returned status is [`SessionStatus::Current`].
    async fn replace_if_current(
        &self,
        user_id: &UserId,
        current: &str,
        next: &str,
    ) -> Result<SessionStatus>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: DashMap<UserId, String>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.sessions.contains_key(user_id)
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, user_id: &UserId, fingerprint: &str) -> Result<()> {
        let _span = store_span!("sessions.save", user_id = %user_id).entered();

        self.sessions.insert(user_id.clone(), fingerprint.to_string());
        Ok(())
    }

    async fn check(&self, user_id: &UserId, fingerprint: &str) -> Result<SessionStatus> {
        let _span = store_span!("sessions.check", user_id = %user_id).entered();

        Ok(match self.sessions.get(user_id) {
            None => SessionStatus::Missing,
            Some(stored) if stored.value() == fingerprint => SessionStatus::Current,
            Some(_) => SessionStatus::Superseded,
        })
    }

    async fn delete(&self, user_id: &UserId) -> Result<()> {
        let _span = store_span!("sessions.delete", user_id = %user_id).entered();

        self.sessions.remove(user_id);
        Ok(())
    }

    async fn delete_if_current(&self, user_id: &UserId, fingerprint: &str) -> Result<bool> {
        let _span = store_span!("sessions.delete_if_current", user_id = %user_id).entered();

        Ok(self.sessions.remove_if(user_id, |_, stored| stored == fingerprint).is_some())
    }

    async fn replace_if_current(
        &self,
        user_id: &UserId,
        current: &str,
        next: &str,
    ) -> Result<SessionStatus> {
        let _span = store_span!("sessions.replace", user_id = %user_id).entered();

        match self.sessions.entry(user_id.clone()) {
            Entry::Vacant(_) => Ok(SessionStatus::Missing),
            Entry::Occupied(mut entry) => {
                if entry.get() != current {
                    return Ok(SessionStatus::Superseded);
                }
                entry.insert(next.to_string());
                Ok(SessionStatus::Current)
            }
        }
    }
}
