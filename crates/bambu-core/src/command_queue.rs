//! Outbound control commands.
//!
//! Commands are issued by the user (light toggle, pause, speed change) and
//! forwarded to the device session at the start of the next update cycle.
//! Forwarding is fire-and-forget: the result becomes visible only through
//! later snapshots.

use crate::device::{ControlCommand, LightMode, SpeedLevel};

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set a light node (e.g. `chamber_light`) to a mode.
    SetLight { node: String, mode: LightMode },
    /// Stop, pause or resume the current job.
    Control(ControlCommand),
    /// Change the print speed. [`SpeedLevel::Unknown`] is never forwarded.
    SetSpeed(SpeedLevel),
    /// Ask the device to publish a full snapshot.
    RequestFullStatus,
    /// Acknowledge the current device error.
    ClearError,
}

// ---------------------------------------------------------------------------
// CommandSink
// ---------------------------------------------------------------------------

/// Device side of command forwarding.
pub trait CommandSink {
    fn set_light(&mut self, node: &str, mode: LightMode);
    fn set_control_command(&mut self, command: ControlCommand);
    fn set_speed_level(&mut self, level: SpeedLevel);
    fn request_full_status(&mut self);
    fn clear_error(&mut self);
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// Commands waiting for the next cycle, plus a bounded history of
/// `(cycle, command)` pairs that were forwarded.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
    history: Vec<(u64, Command)>,
    /// 0 keeps no history.
    max_history: usize,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            max_history,
            ..Self::default()
        }
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Drain pending commands in submission order, recording them in
    /// history under `cycle`.
    pub fn drain(&mut self, cycle: u64) -> Vec<Command> {
        let commands: Vec<Command> = self.pending.drain(..).collect();

        if self.max_history > 0 {
            self.history
                .extend(commands.iter().map(|cmd| (cycle, cmd.clone())));
            let excess = self.history.len().saturating_sub(self.max_history);
            if excess > 0 {
                self.history.drain(..excess);
            }
        }

        commands
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn history(&self) -> &[(u64, Command)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

/// Forward one command. Returns `false` when the command was skipped.
///
/// `ClearError` is skipped while `error_code` is `0`, and
/// `SetSpeed(Unknown)` is always skipped.
pub fn forward<S: CommandSink + ?Sized>(sink: &mut S, command: &Command, error_code: u32) -> bool {
    match command {
        Command::SetLight { node, mode } => sink.set_light(node, *mode),
        Command::Control(control) => sink.set_control_command(*control),
        Command::SetSpeed(level) => {
            if level.level().is_none() {
                return false;
            }
            sink.set_speed_level(*level);
        }
        Command::RequestFullStatus => sink.request_full_status(),
        Command::ClearError => {
            if error_code == 0 {
                return false;
            }
            sink.clear_error();
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl CommandSink for Recorder {
        fn set_light(&mut self, node: &str, mode: LightMode) {
            self.calls.push(format!("light {node} {}", mode.value()));
        }
        fn set_control_command(&mut self, command: ControlCommand) {
            self.calls.push(format!("control {}", command.value()));
        }
        fn set_speed_level(&mut self, level: SpeedLevel) {
            self.calls.push(format!("speed {}", level.description()));
        }
        fn request_full_status(&mut self) {
            self.calls.push("pushall".into());
        }
        fn clear_error(&mut self) {
            self.calls.push("clear".into());
        }
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = CommandQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn drain_preserves_order() {
        let mut queue = CommandQueue::new();
        queue.push(Command::RequestFullStatus);
        queue.push(Command::Control(ControlCommand::Pause));
        let drained = queue.drain(1);
        assert_eq!(
            drained,
            [
                Command::RequestFullStatus,
                Command::Control(ControlCommand::Pause)
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn no_history_by_default() {
        let mut queue = CommandQueue::new();
        queue.push(Command::ClearError);
        queue.drain(3);
        assert!(queue.history().is_empty());
    }

    #[test]
    fn history_is_bounded() {
        let mut queue = CommandQueue::with_max_history(2);
        for cycle in 0..4 {
            queue.push(Command::SetSpeed(SpeedLevel::Sport));
            queue.drain(cycle);
        }
        let cycles: Vec<u64> = queue.history().iter().map(|(c, _)| *c).collect();
        assert_eq!(cycles, [2, 3]);
        queue.clear_history();
        assert!(queue.history().is_empty());
    }

    #[test]
    fn forward_dispatches_each_command() {
        let mut sink = Recorder::default();
        let commands = [
            Command::SetLight {
                node: "chamber_light".into(),
                mode: LightMode::On,
            },
            Command::Control(ControlCommand::Resume),
            Command::SetSpeed(SpeedLevel::Ludicrous),
            Command::RequestFullStatus,
            Command::ClearError,
        ];
        for command in &commands {
            assert!(forward(&mut sink, command, 7));
        }
        assert_eq!(
            sink.calls,
            [
                "light chamber_light on",
                "control resume",
                "speed Ludicrous",
                "pushall",
                "clear"
            ]
        );
    }

    #[test]
    fn clear_error_skipped_without_error() {
        let mut sink = Recorder::default();
        assert!(!forward(&mut sink, &Command::ClearError, 0));
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn unknown_speed_not_forwarded() {
        let mut sink = Recorder::default();
        let unknown = Command::SetSpeed(SpeedLevel::Unknown);
        assert!(!forward(&mut sink, &unknown, 0));
        assert!(sink.calls.is_empty());
    }
}
