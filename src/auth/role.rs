//! Closed set of authorization roles.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Authorization tag assigned to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Support,
    Regular,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Support, Role::Regular];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Support => "support",
            Role::Regular => "regular",
        }
    }

    /// Whether `name` spells one of the known roles exactly.
    pub fn is_valid_name(name: &str) -> bool {
        name.parse::<Role>().is_ok()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "support" => Ok(Role::Support),
            "regular" => Ok(Role::Regular),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// Error returned when a role name is not one of the known roles.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);
