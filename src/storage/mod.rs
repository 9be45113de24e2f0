//! # Storage and Persistence
//!
//! Store contracts used by the auth services: users, role assignments and the
//! one-session-per-user register.

pub mod repositories;

pub use repositories::{
    InMemoryRoleRepository, InMemorySessionRepository, InMemoryUserRepository, RoleRepository,
    SessionRepository, SessionStatus, UserRepository,
};
