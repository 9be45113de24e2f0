//! # Observability Infrastructure
//!
//! Logging setup for embedders of the auth core.

pub mod logging;

pub use logging::{init_logging, log_config_info};

use crate::config::AppConfig;
use crate::errors::Result;

/// Initialise logging from the application config and record the effective settings
pub fn init_observability(config: &AppConfig) -> Result<()> {
    init_logging(&config.observability)?;
    log_config_info(config);
    Ok(())
}
