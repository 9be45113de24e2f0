//! # Configuration Settings
//!
//! Defines the configuration structure for Gatehouse.

use crate::errors::{GatehouseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Minimum length of a token signing secret in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Deployment environment. Drives the log format and default verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = GatehouseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(GatehouseError::config(format!("Unknown environment '{}'", other))),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Deployment environment
    pub environment: Environment,

    /// Token and password configuration
    #[validate(nested)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Build a configuration around the two signing secrets, defaults elsewhere
    pub fn with_secrets<A: Into<String>, R: Into<String>>(access_secret: A, refresh_secret: R) -> Self {
        Self {
            environment: Environment::default(),
            auth: AuthConfig::new(access_secret, refresh_secret),
            observability: ObservabilityConfig::default(),
        }
    }

    /// Load `.env` (when present), read the environment and validate the result
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }

        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let environment = std::env::var("ENV")
            .ok()
            .map(|value| value.parse::<Environment>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            environment,
            auth: AuthConfig::from_env()?,
            observability: ObservabilityConfig::from_env(environment)?,
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(GatehouseError::from)?;
        self.auth.validate_custom()?;
        Ok(())
    }
}

/// Password hashing algorithm used for new hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PasswordAlgorithm {
    #[default]
    Bcrypt,
    Argon2id,
}

impl FromStr for PasswordAlgorithm {
    type Err = GatehouseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bcrypt" => Ok(PasswordAlgorithm::Bcrypt),
            "argon2" | "argon2id" => Ok(PasswordAlgorithm::Argon2id),
            other => {
                Err(GatehouseError::config(format!("Unknown password algorithm '{}'", other)))
            }
        }
    }
}

/// Work factor for the credential verifier
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordConfig {
    /// Algorithm used when hashing new passwords
    pub algorithm: PasswordAlgorithm,

    /// bcrypt cost (log2 rounds)
    #[validate(range(min = 4, max = 31, message = "bcrypt cost must be between 4 and 31"))]
    pub bcrypt_cost: u32,

    /// Argon2id memory cost in KiB
    #[validate(range(min = 8, message = "Argon2 memory cost must be at least 8 KiB"))]
    pub argon2_memory_kib: u32,

    /// Argon2id iteration count
    #[validate(range(min = 1, max = 16, message = "Argon2 iterations must be between 1 and 16"))]
    pub argon2_iterations: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            algorithm: PasswordAlgorithm::Bcrypt,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            argon2_memory_kib: 19 * 1024,
            argon2_iterations: 2,
        }
    }
}

impl PasswordConfig {
    fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            algorithm: parse_env("PASSWORD_ALGORITHM")?.unwrap_or(defaults.algorithm),
            bcrypt_cost: parse_env("BCRYPT_COST")?.unwrap_or(defaults.bcrypt_cost),
            argon2_memory_kib: parse_env("ARGON2_MEMORY_KIB")?
                .unwrap_or(defaults.argon2_memory_kib),
            argon2_iterations: parse_env("ARGON2_ITERATIONS")?
                .unwrap_or(defaults.argon2_iterations),
        })
    }
}

/// Token signing configuration.
///
/// Access and refresh tokens have their own secret and lifetime.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    #[validate(length(min = 1, message = "Access secret cannot be empty"))]
    pub access_secret: String,

    /// Access token lifetime in seconds
    #[validate(range(
        min = 1,
        max = 86400,
        message = "Access token TTL must be between 1 second and 24 hours"
    ))]
    pub access_token_ttl_seconds: u64,

    /// HMAC secret for refresh tokens
    #[validate(length(min = 1, message = "Refresh secret cannot be empty"))]
    pub refresh_secret: String,

    /// Refresh token lifetime in seconds
    #[validate(range(
        min = 1,
        max = 31536000,
        message = "Refresh token TTL must be between 1 second and 365 days"
    ))]
    pub refresh_token_ttl_seconds: u64,

    /// Credential verifier settings
    #[validate(nested)]
    pub password: PasswordConfig,
}

impl AuthConfig {
    /// Access token default lifetime: 15 minutes
    pub const DEFAULT_ACCESS_TTL_SECONDS: u64 = 15 * 60;

    /// Refresh token default lifetime: 2 weeks
    pub const DEFAULT_REFRESH_TTL_SECONDS: u64 = 14 * 24 * 60 * 60;

    pub fn new<A: Into<String>, R: Into<String>>(access_secret: A, refresh_secret: R) -> Self {
        Self {
            access_secret: access_secret.into(),
            access_token_ttl_seconds: Self::DEFAULT_ACCESS_TTL_SECONDS,
            refresh_secret: refresh_secret.into(),
            refresh_token_ttl_seconds: Self::DEFAULT_REFRESH_TTL_SECONDS,
            password: PasswordConfig::default(),
        }
    }

    /// Get access token lifetime as a signed duration
    pub fn access_token_ttl(&self) -> chrono::Duration {
        seconds_to_duration(self.access_token_ttl_seconds)
    }

    /// Get refresh token lifetime as a signed duration
    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        seconds_to_duration(self.refresh_token_ttl_seconds)
    }

    fn from_env() -> Result<Self> {
        Ok(Self {
            access_secret: required_env("JWT_ACCESS_SECRET")?,
            access_token_ttl_seconds: parse_env("JWT_ACCESS_TTL")?
                .unwrap_or(Self::DEFAULT_ACCESS_TTL_SECONDS),
            refresh_secret: required_env("JWT_REFRESH_SECRET")?,
            refresh_token_ttl_seconds: parse_env("JWT_REFRESH_TTL")?
                .unwrap_or(Self::DEFAULT_REFRESH_TTL_SECONDS),
            password: PasswordConfig::from_env()?,
        })
    }

    /// Checks the validator attributes cannot express
    pub(crate) fn validate_custom(&self) -> Result<()> {
        if self.access_secret.len() < MIN_SECRET_LENGTH {
            return Err(GatehouseError::validation_field(
                format!("Access secret must be at least {} bytes long", MIN_SECRET_LENGTH),
                "access_secret",
            ));
        }

        if self.refresh_secret.len() < MIN_SECRET_LENGTH {
            return Err(GatehouseError::validation_field(
                format!("Refresh secret must be at least {} bytes long", MIN_SECRET_LENGTH),
                "refresh_secret",
            ));
        }

        if self.access_secret == self.refresh_secret {
            return Err(GatehouseError::validation(
                "Access and refresh tokens must be signed with different secrets",
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &"[redacted]")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_secret", &"[redacted]")
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("password", &self.password)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to startup logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Local)
    }
}

impl ObservabilityConfig {
    /// Defaults per environment: human-readable debug logs locally, JSON elsewhere
    pub fn for_environment(environment: Environment) -> Self {
        let (log_level, json_logging) = match environment {
            Environment::Local => ("debug", false),
            Environment::Dev => ("debug", true),
            Environment::Prod => ("info", true),
        };

        Self {
            service_name: "gatehouse".to_string(),
            log_level: log_level.to_string(),
            json_logging,
        }
    }

    fn from_env(environment: Environment) -> Result<Self> {
        let defaults = Self::for_environment(environment);

        let log_level = std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level);
        let json_logging = std::env::var("LOG_JSON")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(defaults.json_logging);

        Ok(Self { service_name: defaults.service_name, log_level, json_logging })
    }
}

fn seconds_to_duration(seconds: u64) -> chrono::Duration {
    i64::try_from(seconds)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}

fn required_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|e| {
        GatehouseError::config_with_source(format!("{} must be set", key), Box::new(e))
    })
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| GatehouseError::config(format!("Invalid {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}
