//! Shared test helpers for integration tests, benchmarks and fuzzing.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::command_queue::{Command, CommandSink};
use crate::device::{ControlCommand, LightMode, SpeedLevel};
use crate::event::{NotificationKind, NotificationSink};
use crate::session::DeviceSession;
use crate::snapshot::*;

// ===========================================================================
// Timestamps
// ===========================================================================

/// Instant `secs` seconds after the Unix epoch.
pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

// ===========================================================================
// Snapshot builders
// ===========================================================================

pub fn snapshot(print: PrintReport) -> Snapshot {
    Snapshot::new(print, DateTime::default())
}

pub fn snapshot_at(print: PrintReport, secs: i64) -> Snapshot {
    Snapshot::new(print, at(secs))
}

pub fn percent_report(percent: u32) -> PrintReport {
    PrintReport {
        mc_percent: Some(percent),
        ..Default::default()
    }
}

pub fn error_report(code: u32) -> PrintReport {
    PrintReport {
        print_error: Some(code),
        ..Default::default()
    }
}

pub fn mode_report(print_type: &str) -> PrintReport {
    PrintReport {
        print_type: Some(print_type.to_string()),
        ..Default::default()
    }
}

pub fn ams_report(units: Vec<AmsUnitReport>) -> PrintReport {
    PrintReport {
        ams: Some(AmsReport { units }),
        ..Default::default()
    }
}

pub fn ams_unit(id: &str, trays: Vec<TrayReport>) -> AmsUnitReport {
    AmsUnitReport {
        id: id.to_string(),
        humidity: None,
        temp: None,
        trays,
    }
}

pub fn tray(id: &str, tray_info_idx: Option<&str>, tray_color: Option<&str>) -> TrayReport {
    TrayReport {
        id: id.to_string(),
        tray_info_idx: tray_info_idx.map(str::to_string),
        tray_color: tray_color.map(str::to_string),
        tray_type: None,
    }
}

pub fn virtual_tray_report(
    id: &str,
    tray_info_idx: Option<&str>,
    tray_temp: Option<&str>,
) -> PrintReport {
    PrintReport {
        vt_tray: Some(VirtualTrayReport {
            id: id.to_string(),
            tray_temp: tray_temp.map(str::to_string),
            tray_info_idx: tray_info_idx.map(str::to_string),
            tray_color: None,
        }),
        ..Default::default()
    }
}

pub fn thumbnail(id: &str, secs: i64) -> ThumbnailUpdate {
    ThumbnailUpdate {
        id: id.to_string(),
        image: ThumbnailImage::Ref(format!("{id}.png")),
        last_updated: at(secs),
    }
}

// ===========================================================================
// FakeSession
// ===========================================================================

/// In-memory session: a fixed full snapshot plus queues of incremental
/// snapshots and thumbnails handed out one per call. Forwarded commands are
/// recorded in `sent`.
#[derive(Debug, Default)]
pub struct FakeSession {
    pub name: String,
    pub full: Option<Snapshot>,
    pub statuses: VecDeque<Snapshot>,
    pub thumbnails: VecDeque<ThumbnailUpdate>,
    pub error_code: u32,
    pub total_layers: u32,
    pub sent: Vec<Command>,
}

impl FakeSession {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn push_status(&mut self, snapshot: Snapshot) {
        self.statuses.push_back(snapshot);
    }

    pub fn push_thumbnail(&mut self, update: ThumbnailUpdate) {
        self.thumbnails.push_back(update);
    }

    pub fn pending_status(&self) -> usize {
        self.statuses.len()
    }
}

impl CommandSink for FakeSession {
    fn set_light(&mut self, node: &str, mode: LightMode) {
        self.sent.push(Command::SetLight {
            node: node.to_string(),
            mode,
        });
    }

    fn set_control_command(&mut self, command: ControlCommand) {
        self.sent.push(Command::Control(command));
    }

    fn set_speed_level(&mut self, level: SpeedLevel) {
        self.sent.push(Command::SetSpeed(level));
    }

    fn request_full_status(&mut self) {
        self.sent.push(Command::RequestFullStatus);
    }

    fn clear_error(&mut self) {
        self.sent.push(Command::ClearError);
    }
}

impl DeviceSession for FakeSession {
    fn get_full_status(&self) -> Option<Snapshot> {
        self.full.clone()
    }

    fn get_status(&mut self) -> Option<Snapshot> {
        self.statuses.pop_front()
    }

    fn get_thumbnail(&mut self) -> Option<ThumbnailUpdate> {
        self.thumbnails.pop_front()
    }

    fn device_name(&self) -> &str {
        &self.name
    }

    fn print_error_code(&self) -> u32 {
        self.error_code
    }

    fn total_layer_count(&self) -> u32 {
        self.total_layers
    }
}

// ===========================================================================
// RecordingSink
// ===========================================================================

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub received: Vec<(NotificationKind, String)>,
}

impl RecordingSink {
    pub fn count(&self, kind: NotificationKind) -> usize {
        self.received.iter().filter(|(k, _)| *k == kind).count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, kind: NotificationKind, message: &str) {
        self.received.push((kind, message.to_string()));
    }
}
