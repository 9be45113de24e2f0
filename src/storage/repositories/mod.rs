//! Repository modules for data access
//!
//! Each collaborator the auth services depend on is an async trait with an
//! in-memory implementation. Durable backends implement the same traits.

pub mod role;
pub mod session;
pub mod user;

pub use role::{InMemoryRoleRepository, RoleRepository};
pub use session::{InMemorySessionRepository, SessionRepository, SessionStatus};
pub use user::{InMemoryUserRepository, UserRepository};
