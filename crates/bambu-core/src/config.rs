//! Dashboard tuning knobs.

use crate::device::PRINT_TYPE_IDLE;
use crate::format::DEFAULT_TIMESTAMP_FORMAT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Operating-mode code that counts as idle.
    pub idle_print_type: String,
    /// Capacity of the notification ring log.
    pub notification_capacity: usize,
    /// Number of forwarded commands kept in history.
    pub command_history: usize,
    /// chrono format string for rendered timestamps.
    pub timestamp_format: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            idle_print_type: PRINT_TYPE_IDLE.to_string(),
            notification_capacity: 64,
            command_history: 32,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.idle_print_type, "idle");
        assert_eq!(config.notification_capacity, 64);
        assert_eq!(config.command_history, 32);
        assert_eq!(config.timestamp_format, "%Y-%m-%d %H:%M:%S");
    }
}
