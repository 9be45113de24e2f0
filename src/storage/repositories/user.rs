//! User repository
//!
//! Lookup by id or email and creation with unique email addresses.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::auth::user::{NewUser, User, UserLookup};
use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::store_span;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id or email. Fails with `NotFound` when nothing matches.
    async fn find(&self, lookup: &UserLookup) -> Result<User>;

    /// Persist a new user and return it with its assigned id.
    /// Fails with `Conflict` when the email is already registered.
    async fn save(&self, user: NewUser) -> Result<User>;
}

/// Process-local user store.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: DashMap<UserId, User>,
    emails: DashMap<String, UserId>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find(&self, lookup: &UserLookup) -> Result<User> {
        let _span = store_span!("users.find", lookup = %lookup).entered();

        let id = match lookup {
            UserLookup::Id(id) => id.clone(),
            UserLookup::Email(email) => match self.emails.get(email) {
                Some(entry) => entry.value().clone(),
                None => return Err(Error::not_found("user", lookup.to_string())),
            },
        };

        self.users
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::not_found("user", lookup.to_string()))
    }

    async fn save(&self, user: NewUser) -> Result<User> {
        let _span = store_span!("users.save").entered();

        // The email entry stays locked until the user row is in place.
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(Error::conflict(
                format!("User with email '{}' already exists", user.email),
                "user",
            )),
            Entry::Vacant(slot) => {
                let record = User {
                    id: UserId::new(),
                    last_name: user.last_name,
                    first_name: user.first_name,
                    middle_name: user.middle_name,
                    email: user.email,
                    hashed_password: user.hashed_password,
                    created_at: Utc::now(),
                    updated_at: None,
                };
                self.users.insert(record.id.clone(), record.clone());
                slot.insert(record.id.clone());
                Ok(record)
            }
        }
    }
}
