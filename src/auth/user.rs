//! User domain models.
//!
//! Users are owned by the user store; the auth services only read them and
//! project them into token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::domain::UserId;

/// Stored representation of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Normalize email to lowercase for consistent storage and comparison.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Identity projection embedded in issued tokens.
    pub fn claims(&self) -> UserClaims {
        UserClaims { id: self.id.clone(), email: self.email.clone() }
    }
}

/// New user payload handed to the user store. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub email: String,
    pub hashed_password: String,
}

/// Minimal identity carried inside access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub id: UserId,
    pub email: String,
}

/// Key used to find a user: either the id or the email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(UserId),
    Email(String),
}

impl UserLookup {
    /// Interpret a free-form identifier: UUID-shaped strings are ids, anything
    /// else is treated as an email address.
    pub fn from_slug(slug: &str) -> Self {
        match UserId::parse(slug.trim()) {
            Ok(id) => UserLookup::Id(id),
            Err(_) => UserLookup::Email(User::normalize_email(slug)),
        }
    }
}

impl Display for UserLookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UserLookup::Id(id) => write!(f, "id:{}", id),
            UserLookup::Email(email) => write!(f, "email:{}", email),
        }
    }
}

impl From<UserId> for UserLookup {
    fn from(id: UserId) -> Self {
        UserLookup::Id(id)
    }
}
