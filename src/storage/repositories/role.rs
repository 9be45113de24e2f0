//! Role assignment repository

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeSet;

use crate::auth::role::Role;
use crate::domain::UserId;
use crate::errors::Result;
use crate::store_span;

#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Whether the user holds at least one of `candidates`.
    async fn check(&self, user_id: &UserId, candidates: &[Role]) -> Result<bool>;

    /// Roles currently assigned to the user, in a stable order.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Role>>;

    /// Assign every role in the batch. Assigning a held role is a no-op.
    async fn add(&self, user_id: &UserId, roles: &[Role]) -> Result<()>;

    /// Remove every role in the batch. Removing an absent role is a no-op.
    async fn remove(&self, user_id: &UserId, roles: &[Role]) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    assignments: DashMap<UserId, BTreeSet<Role>>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn check(&self, user_id: &UserId, candidates: &[Role]) -> Result<bool> {
        let _span = store_span!("roles.check", user_id = %user_id).entered();

        if candidates.is_empty() {
            return Ok(true);
        }

        Ok(self
            .assignments
            .get(user_id)
            .map(|held| candidates.iter().any(|role| held.contains(role)))
            .unwrap_or(false))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Role>> {
        let _span = store_span!("roles.list", user_id = %user_id).entered();

        Ok(self
            .assignments
            .get(user_id)
            .map(|held| held.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn add(&self, user_id: &UserId, roles: &[Role]) -> Result<()> {
        let _span = store_span!("roles.add", user_id = %user_id, count = roles.len()).entered();

        self.assignments.entry(user_id.clone()).or_default().extend(roles.iter().copied());
        Ok(())
    }

    async fn remove(&self, user_id: &UserId, roles: &[Role]) -> Result<()> {
        let _span = store_span!("roles.remove", user_id = %user_id, count = roles.len()).entered();

        if let Some(mut held) = self.assignments.get_mut(user_id) {
            for role in roles {
                held.remove(role);
            }
        }
        Ok(())
    }
}
