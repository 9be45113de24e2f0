//! # Structured Logging
//!
//! Subscriber setup and span helpers built on the tracing ecosystem.
//!
//! Operations carry their own correlation data (see
//! [`crate::auth::OperationContext`]) so nothing here holds per-request state.
//! The subscriber installed by [`init_logging`] is process-wide and read-only
//! once set.

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{GatehouseError, Result};

/// Create a debug span around a storage operation.
///
/// ```rust,ignore
/// let span = store_span!("sessions.save", user_id = %user_id);
/// ```
#[macro_export]
macro_rules! store_span {
    ($operation:expr) => {
        tracing::debug_span!(
            "store_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "store_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. When a global
/// subscriber is already installed the existing one is kept.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            GatehouseError::config_with_source(
                format!("Invalid log level '{}'", config.log_level),
                Box::new(e),
            )
        })?;

    let installed = if config.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .with_target(false)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init()
    };

    if let Err(e) = installed {
        tracing::debug!(error = %e, "global subscriber already installed; keeping it");
    }
    Ok(())
}

/// Log configuration at startup. Secrets are never part of the output.
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        service_name = %config.observability.service_name,
        environment = %config.environment,
        access_token_ttl_seconds = config.auth.access_token_ttl_seconds,
        refresh_token_ttl_seconds = config.auth.refresh_token_ttl_seconds,
        password_algorithm = ?config.auth.password.algorithm,
        json_logging = config.observability.json_logging,
        "Gatehouse configuration"
    );
}
