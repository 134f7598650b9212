//! Recorded device sessions and their replay.
//!
//! A recording captures what a transport delivered to the dashboard: the
//! full snapshot (if any), then one entry per update cycle with an optional
//! incremental snapshot and an optional thumbnail. [`ReplaySession`] plays a
//! recording back through the [`DeviceSession`] contract.

use std::path::Path;

use bambu_core::command_queue::{Command, CommandSink};
use bambu_core::device::{ControlCommand, LightMode, SpeedLevel};
use bambu_core::session::DeviceSession;
use bambu_core::snapshot::{Snapshot, ThumbnailUpdate};
use serde::{Deserialize, Serialize};

use crate::loader::{self, DataLoadError};

// ===========================================================================
// File model
// ===========================================================================

/// Everything a transport delivered during one recorded session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedSession {
    pub device_name: String,
    #[serde(default)]
    pub total_layer_count: u32,
    /// The complete baseline snapshot.
    #[serde(default)]
    pub full: Option<Snapshot>,
    /// Number of cycles that pass before the full snapshot becomes
    /// available.
    #[serde(default)]
    pub full_after: usize,
    #[serde(default)]
    pub cycles: Vec<RecordedCycle>,
}

/// What the transport delivered during one update cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedCycle {
    #[serde(default)]
    pub status: Option<Snapshot>,
    #[serde(default)]
    pub thumbnail: Option<ThumbnailUpdate>,
}

/// Load a recording from a RON, TOML or JSON file.
pub fn load_recording(path: &Path) -> Result<RecordedSession, DataLoadError> {
    let recording: RecordedSession = loader::deserialize_file(path)?;
    tracing::debug!(
        device = %recording.device_name,
        cycles = recording.cycles.len(),
        has_full = recording.full.is_some(),
        "recording loaded"
    );
    Ok(recording)
}

/// Load the recording `{name}.{ron,toml,json}` from `dir`.
pub fn load_named(dir: &Path, name: &str) -> Result<RecordedSession, DataLoadError> {
    load_recording(&loader::locate_required(dir, name)?)
}

// ===========================================================================
// Replay
// ===========================================================================

/// Replays a [`RecordedSession`], handing out one recorded cycle per call to
/// [`DeviceSession::get_status`].
#[derive(Debug)]
pub struct ReplaySession {
    recording: RecordedSession,
    cursor: usize,
    /// Thumbnail of the cycle taken by the last `get_status` call.
    pending_thumbnail: Option<ThumbnailUpdate>,
    last_thumbnail: Option<String>,
    /// Error code of the last snapshot delivered that carried one.
    error_code: u32,
    sent: Vec<Command>,
}

impl ReplaySession {
    /// Start a replay before its first cycle. The session error code starts
    /// at the full snapshot's.
    pub fn new(recording: RecordedSession) -> Self {
        let error_code = recording
            .full
            .as_ref()
            .and_then(|full| full.print.as_ref())
            .and_then(|print| print.print_error)
            .unwrap_or(0);
        Self {
            recording,
            cursor: 0,
            pending_thumbnail: None,
            last_thumbnail: None,
            error_code,
            sent: Vec::new(),
        }
    }

    /// Replay the recording stored at `path`.
    pub fn from_file(path: &Path) -> Result<Self, DataLoadError> {
        load_recording(path).map(Self::new)
    }

    /// Replay the recording named `name` in `dir`.
    pub fn from_dir(dir: &Path, name: &str) -> Result<Self, DataLoadError> {
        load_named(dir, name).map(Self::new)
    }

    /// Whether every recorded cycle has been handed out.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.recording.cycles.len()
    }

    /// Number of recorded cycles.
    pub fn cycle_count(&self) -> usize {
        self.recording.cycles.len()
    }

    /// Commands the dashboard forwarded, in order.
    pub fn sent(&self) -> &[Command] {
        &self.sent
    }

    fn record(&mut self, command: Command) {
        tracing::info!(?command, "command sent to device");
        self.sent.push(command);
    }
}

impl CommandSink for ReplaySession {
    fn set_light(&mut self, node: &str, mode: LightMode) {
        self.record(Command::SetLight {
            node: node.to_string(),
            mode,
        });
    }

    fn set_control_command(&mut self, command: ControlCommand) {
        self.record(Command::Control(command));
    }

    fn set_speed_level(&mut self, level: SpeedLevel) {
        self.record(Command::SetSpeed(level));
    }

    fn request_full_status(&mut self) {
        self.record(Command::RequestFullStatus);
    }

    fn clear_error(&mut self) {
        self.record(Command::ClearError);
    }
}

impl DeviceSession for ReplaySession {
    fn get_full_status(&self) -> Option<Snapshot> {
        if self.cursor < self.recording.full_after {
            return None;
        }
        self.recording.full.clone()
    }

    fn get_status(&mut self) -> Option<Snapshot> {
        let cycle = self.recording.cycles.get(self.cursor)?.clone();
        self.cursor += 1;
        self.pending_thumbnail = cycle.thumbnail;
        let status = cycle.status?;
        if let Some(code) = status.print.as_ref().and_then(|p| p.print_error) {
            self.error_code = code;
        }
        Some(status)
    }

    fn get_thumbnail(&mut self) -> Option<ThumbnailUpdate> {
        let thumbnail = self.pending_thumbnail.take()?;
        if self.last_thumbnail.as_deref() == Some(thumbnail.id.as_str()) {
            return None;
        }
        self.last_thumbnail = Some(thumbnail.id.clone());
        Some(thumbnail)
    }

    fn device_name(&self) -> &str {
        &self.recording.device_name
    }

    fn print_error_code(&self) -> u32 {
        self.error_code
    }

    fn total_layer_count(&self) -> u32 {
        self.recording.total_layer_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bambu_core::test_utils::{error_report, snapshot, thumbnail};

    fn cycle(status: Option<Snapshot>, thumb: Option<ThumbnailUpdate>) -> RecordedCycle {
        RecordedCycle {
            status,
            thumbnail: thumb,
        }
    }

    fn recording(cycles: Vec<RecordedCycle>) -> RecordedSession {
        RecordedSession {
            device_name: "X1C".into(),
            total_layer_count: 100,
            full: Some(snapshot(error_report(3))),
            full_after: 0,
            cycles,
        }
    }

    #[test]
    fn hands_out_one_cycle_per_call() {
        let mut replay = ReplaySession::new(recording(vec![
            cycle(Some(snapshot(error_report(0))), None),
            cycle(None, None),
        ]));
        assert_eq!(replay.print_error_code(), 3);
        assert!(replay.get_status().is_some());
        assert_eq!(replay.print_error_code(), 0);
        assert!(replay.get_status().is_none());
        assert!(replay.is_finished());
        assert!(replay.get_status().is_none());
    }

    #[test]
    fn full_snapshot_delayed() {
        let mut rec = recording(vec![cycle(None, None), cycle(None, None)]);
        rec.full_after = 1;
        let mut replay = ReplaySession::new(rec);
        assert!(replay.get_full_status().is_none());
        replay.get_status();
        assert!(replay.get_full_status().is_some());
    }

    #[test]
    fn thumbnails_deduplicated_by_identity() {
        let mut replay = ReplaySession::new(recording(vec![
            cycle(None, Some(thumbnail("a", 1))),
            cycle(None, Some(thumbnail("a", 2))),
            cycle(None, Some(thumbnail("b", 3))),
        ]));
        let mut delivered = Vec::new();
        while !replay.is_finished() {
            replay.get_status();
            if let Some(t) = replay.get_thumbnail() {
                delivered.push(t.id);
            }
        }
        assert_eq!(delivered, ["a", "b"]);
    }

    #[test]
    fn thumbnail_taken_once_per_cycle() {
        let mut replay = ReplaySession::new(recording(vec![cycle(None, Some(thumbnail("a", 1)))]));
        replay.get_status();
        assert!(replay.get_thumbnail().is_some());
        assert!(replay.get_thumbnail().is_none());
    }

    #[test]
    fn commands_recorded() {
        let mut replay = ReplaySession::new(recording(Vec::new()));
        replay.set_control_command(ControlCommand::Stop);
        replay.request_full_status();
        assert_eq!(
            replay.sent(),
            [Command::Control(ControlCommand::Stop), Command::RequestFullStatus]
        );
    }
}
