//! The materialized view of one device.
//!
//! Every field holds the value from the most recent snapshot in which it was
//! present. Fields are only written by the [`crate::merge`] module; the
//! accessors here derive display text from the merged values.

use crate::device::{LightMode, PRINT_TYPE_IDLE, SpeedLevel};
use crate::device_error;
use crate::format::{format_duration, format_temperature, format_timestamp};
use crate::snapshot::ThumbnailImage;
use chrono::{DateTime, Utc};

/// Image currently shown for the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailView {
    pub id: String,
    pub image: ThumbnailImage,
    pub updated: DateTime<Utc>,
}

/// Last known value of every telemetry field of one device.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedState {
    /// Percentage complete, clamped to 100. `None` renders as indeterminate.
    pub percent: Option<u32>,
    pub remaining_minutes: Option<u32>,
    pub gcode_file: Option<String>,
    pub layer_num: Option<u32>,
    pub total_layer_num: Option<u32>,
    pub bed_temper: Option<f64>,
    pub bed_target_temper: Option<f64>,
    pub nozzle_temper: Option<f64>,
    pub nozzle_target_temper: Option<f64>,
    pub chamber_temper: Option<f64>,
    pub speed: Option<SpeedLevel>,
    /// Raw chamber light mode string.
    pub chamber_light: Option<String>,
    pub command: Option<String>,
    pub sequence_id: Option<String>,
    /// Operating-mode code; starts idle.
    pub print_type: String,
    /// Error code; starts at `0` (no error).
    pub print_error: u32,
    pub last_updated: Option<DateTime<Utc>>,
    /// Set once the full snapshot has been applied. Never reset.
    pub full_applied: bool,
    pub thumbnail: Option<ThumbnailView>,
}

impl Default for MaterializedState {
    fn default() -> Self {
        Self {
            percent: None,
            remaining_minutes: None,
            gcode_file: None,
            layer_num: None,
            total_layer_num: None,
            bed_temper: None,
            bed_target_temper: None,
            nozzle_temper: None,
            nozzle_target_temper: None,
            chamber_temper: None,
            speed: None,
            chamber_light: None,
            command: None,
            sequence_id: None,
            print_type: PRINT_TYPE_IDLE.to_string(),
            print_error: 0,
            last_updated: None,
            full_applied: false,
            thumbnail: None,
        }
    }
}

impl MaterializedState {
    /// Create an empty state in the default idle mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty state whose operating mode starts at `print_type`.
    pub fn with_print_type(print_type: &str) -> Self {
        Self {
            print_type: print_type.to_string(),
            ..Self::default()
        }
    }

    /// Whether progress should render as an indeterminate bar.
    pub fn is_progress_indeterminate(&self) -> bool {
        self.percent.is_none()
    }

    /// Whether an error code is active.
    pub fn has_error(&self) -> bool {
        self.print_error != 0
    }

    /// Description of the current error, `None` while there is no error.
    pub fn error_description(&self) -> Option<String> {
        self.has_error()
            .then(|| device_error::resolve(self.print_error))
    }

    /// `<duration> remaining`.
    pub fn remaining_label(&self) -> Option<String> {
        self.remaining_minutes
            .map(|m| format!("{} remaining", format_duration(u64::from(m))))
    }

    /// `Layer N / T`, where `T` comes from the device session.
    pub fn layer_label(&self, total_layers: u32) -> Option<String> {
        self.layer_num
            .map(|layer| format!("Layer {layer} / {total_layers}"))
    }

    /// Temperature labels, e.g. `55.00ºC`.
    pub fn bed_label(&self) -> Option<String> {
        self.bed_temper.map(format_temperature)
    }

    pub fn bed_target_label(&self) -> Option<String> {
        self.bed_target_temper.map(format_temperature)
    }

    pub fn nozzle_label(&self) -> Option<String> {
        self.nozzle_temper.map(format_temperature)
    }

    pub fn nozzle_target_label(&self) -> Option<String> {
        self.nozzle_target_temper.map(format_temperature)
    }

    pub fn chamber_label(&self) -> Option<String> {
        self.chamber_temper.map(format_temperature)
    }

    /// A positive bed reading means the heater is on.
    pub fn is_bed_heating(&self) -> bool {
        self.bed_temper.is_some_and(|t| t > 0.0)
    }

    pub fn is_nozzle_heating(&self) -> bool {
        self.nozzle_temper.is_some_and(|t| t > 0.0)
    }

    /// Description of the speed profile, e.g. `Sport`.
    pub fn speed_label(&self) -> Option<&'static str> {
        self.speed.map(SpeedLevel::description)
    }

    /// Only the `on` mode counts as lit; `flashing` does not.
    pub fn is_lamp_on(&self) -> bool {
        self.chamber_light.as_deref() == Some(LightMode::On.value())
    }

    /// `Last Updated: <ts>` with a ` / Print Error <description>` suffix
    /// while an error is active.
    pub fn title_line(&self, timestamp_format: &str) -> String {
        let updated = self
            .last_updated
            .as_ref()
            .map(|at| format_timestamp(at, timestamp_format))
            .unwrap_or_else(|| "--".to_string());
        match self.error_description() {
            Some(description) => format!("Last Updated: {updated} / Print Error {description}"),
            None => format!("Last Updated: {updated}"),
        }
    }

    /// Multi-line status summary for diagnostics.
    pub fn status_summary(&self, timestamp_format: &str) -> String {
        let updated = self
            .last_updated
            .as_ref()
            .map(|at| format_timestamp(at, timestamp_format))
            .unwrap_or_default();
        format!(
            "Command: {}\nSequence: {}\nNozzle: {}\nBed: {}\nUpdated: {}\n",
            self.command.as_deref().unwrap_or(""),
            self.sequence_id.as_deref().unwrap_or(""),
            format_temperature(self.nozzle_temper.unwrap_or(0.0)),
            format_temperature(self.bed_temper.unwrap_or(0.0)),
            updated,
        )
    }

    /// When the shown thumbnail was produced.
    pub fn thumbnail_updated_label(&self, timestamp_format: &str) -> Option<String> {
        self.thumbnail
            .as_ref()
            .map(|t| format_timestamp(&t.updated, timestamp_format))
    }
}
