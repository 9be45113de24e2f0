//! # Configuration Management
//!
//! Signing secrets, token lifetimes, password work factor and logging knobs.
//! Values come from environment variables (optionally seeded from a `.env`
//! file) and are validated before use.

mod settings;

pub use settings::{
    AppConfig, AuthConfig, Environment, ObservabilityConfig, PasswordAlgorithm, PasswordConfig,
    MIN_SECRET_LENGTH,
};
