//! Role-based authorization gate.
//!
//! A check passes when the user holds ANY of the required roles. An empty
//! requirement always passes without consulting the role store.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

use crate::auth::role::Role;
use crate::domain::UserId;
use crate::errors::Result;
use crate::storage::RoleRepository;

/// Parse raw role names, dropping unknown ones and duplicates.
///
/// # Examples
///
/// ```rust
/// use gatehouse::auth::authorization::valid_roles;
/// use gatehouse::auth::Role;
///
/// let roles = valid_roles(&["support", "superuser", "admin", "support"]);
/// assert_eq!(roles, vec![Role::Support, Role::Admin]);
/// ```
pub fn valid_roles<S: AsRef<str>>(raw: &[S]) -> Vec<Role> {
    let mut seen = BTreeSet::new();
    let mut roles = Vec::with_capacity(raw.len());
    for name in raw {
        match name.as_ref().parse::<Role>() {
            Ok(role) => {
                if seen.insert(role) {
                    roles.push(role);
                }
            }
            Err(err) => warn!(error = %err, "skipping invalid role"),
        }
    }
    roles
}

#[derive(Clone)]
pub struct AuthorizationGate {
    roles: Arc<dyn RoleRepository>,
}

impl AuthorizationGate {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    /// Whether the user holds at least one of `required`.
    pub async fn check(&self, user_id: &UserId, required: &[Role]) -> Result<bool> {
        if required.is_empty() {
            return Ok(true);
        }
        self.roles.check(user_id, required).await
    }

    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Role>> {
        self.roles.list_for_user(user_id).await
    }

    /// Assign the valid names in `raw` as one batch. Invalid names are skipped.
    pub async fn add<S: AsRef<str> + Sync>(&self, user_id: &UserId, raw: &[S]) -> Result<()> {
        let roles = valid_roles(raw);
        if roles.is_empty() {
            return Ok(());
        }
        self.roles.add(user_id, &roles).await
    }

    /// Remove the valid names in `raw` as one batch. Invalid names are skipped.
    pub async fn remove<S: AsRef<str> + Sync>(&self, user_id: &UserId, raw: &[S]) -> Result<()> {
        let roles = valid_roles(raw);
        if roles.is_empty() {
            return Ok(());
        }
        self.roles.remove(user_id, &roles).await
    }
}
