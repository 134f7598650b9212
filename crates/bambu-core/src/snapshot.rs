//! Sparse device snapshots as delivered by the transport layer.
//!
//! Every telemetry field is an `Option`: `None` means the device did not
//! report the field in this message and the materialized value must be left
//! alone. Field names follow the printer's report schema so transports can
//! decode device messages straight into these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One device message: an optional print report plus the instant the
/// transport received it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub print: Option<PrintReport>,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(print: PrintReport, last_updated: DateTime<Utc>) -> Self {
        Self {
            print: Some(print),
            last_updated,
        }
    }
}

/// The `print` section of a device report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintReport {
    /// Percentage complete.
    pub mc_percent: Option<u32>,
    /// Remaining time estimate, in minutes.
    pub mc_remaining_time: Option<u32>,
    pub gcode_file: Option<String>,
    pub layer_num: Option<u32>,
    pub total_layer_num: Option<u32>,
    pub bed_temper: Option<f64>,
    pub bed_target_temper: Option<f64>,
    pub nozzle_temper: Option<f64>,
    pub nozzle_target_temper: Option<f64>,
    pub chamber_temper: Option<f64>,
    pub spd_lvl: Option<u32>,
    /// Operating-mode code (`"idle"`, `"cloud"`, `"local"`, ...).
    pub print_type: Option<String>,
    /// Device error code; `0` means no error.
    pub print_error: Option<u32>,
    pub command: Option<String>,
    pub sequence_id: Option<String>,
    pub ams: Option<AmsReport>,
    pub vt_tray: Option<VirtualTrayReport>,
    pub lights_report: Vec<LightReport>,
}

/// Multi-slot AMS block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmsReport {
    #[serde(rename = "ams")]
    pub units: Vec<AmsUnitReport>,
}

/// One AMS unit with its trays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmsUnitReport {
    pub id: String,
    /// Humidity bucket, `"0"` through `"4"`.
    pub humidity: Option<String>,
    /// Temperature as reported, string-encoded.
    pub temp: Option<String>,
    #[serde(rename = "tray")]
    pub trays: Vec<TrayReport>,
}

/// A tray inside an AMS unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrayReport {
    pub id: String,
    /// Filament catalog index; absent when the tray is empty.
    pub tray_info_idx: Option<String>,
    /// `RRGGBBAA` hex color.
    pub tray_color: Option<String>,
    pub tray_type: Option<String>,
}

/// The single external spool holder used when no AMS is attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualTrayReport {
    pub id: String,
    /// Temperature as reported, string-encoded.
    pub tray_temp: Option<String>,
    pub tray_info_idx: Option<String>,
    pub tray_color: Option<String>,
}

/// A lighting node state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightReport {
    pub node: String,
    pub mode: String,
}

impl PrintReport {
    /// The AMS units if the block lists at least one, which makes it take
    /// precedence over the virtual tray.
    pub fn ams_units(&self) -> Option<&[AmsUnitReport]> {
        self.ams
            .as_ref()
            .map(|ams| ams.units.as_slice())
            .filter(|units| !units.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Thumbnails
// ---------------------------------------------------------------------------

/// Image payload of a thumbnail update: raw bytes or an external reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThumbnailImage {
    Bytes(Vec<u8>),
    Ref(String),
}

/// A thumbnail delivered on the thumbnail stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailUpdate {
    /// Identity token; equal tokens describe the same image.
    pub id: String,
    pub image: ThumbnailImage,
    pub last_updated: DateTime<Utc>,
}
