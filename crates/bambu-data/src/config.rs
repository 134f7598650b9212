//! Loading and validation of `dashboard.{ron,toml,json}`.

use std::path::Path;

use bambu_core::config::DashboardConfig;
use chrono::format::{Item, StrftimeItems};

use crate::loader::{self, DataLoadError};

/// Base name of the dashboard configuration file.
pub const CONFIG_BASE_NAME: &str = "dashboard";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] DataLoadError),

    #[error("idle_print_type must not be empty")]
    EmptyIdleCode,

    #[error("notification_capacity must be at least 1")]
    ZeroCapacity,

    #[error("invalid timestamp_format '{format}'")]
    InvalidTimestampFormat { format: String },
}

/// Load the dashboard configuration from `dir`. A missing file yields the
/// defaults.
pub fn load_dashboard_config(dir: &Path) -> Result<DashboardConfig, ConfigError> {
    let config = match loader::locate(dir, CONFIG_BASE_NAME)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading dashboard config");
            loader::deserialize_file(&path)?
        }
        None => DashboardConfig::default(),
    };
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &DashboardConfig) -> Result<(), ConfigError> {
    if config.idle_print_type.is_empty() {
        return Err(ConfigError::EmptyIdleCode);
    }
    if config.notification_capacity == 0 {
        return Err(ConfigError::ZeroCapacity);
    }
    if StrftimeItems::new(&config.timestamp_format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidTimestampFormat {
            format: config.timestamp_format.clone(),
        });
    }
    Ok(())
}
