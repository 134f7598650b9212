//! Edge detectors over merged values.
//!
//! Each detector remembers the last value it observed and reports only
//! changes. `observe` compares and records in one `&mut self` call, so a
//! detector cannot fire twice for the same transition.

use crate::device::PRINT_TYPE_IDLE;

/// Change of the device error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTransition {
    /// The code changed to a non-zero value.
    Raised(u32),
    /// The code changed back to `0`.
    Cleared,
}

/// Error code edge detector. Starts at `0` (no error).
#[derive(Debug, Clone, Default)]
pub struct ErrorEdge {
    last: u32,
}

impl ErrorEdge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, code: u32) -> Option<ErrorTransition> {
        if code == self.last {
            return None;
        }
        self.last = code;
        if code == 0 {
            Some(ErrorTransition::Cleared)
        } else {
            Some(ErrorTransition::Raised(code))
        }
    }

    pub fn last(&self) -> u32 {
        self.last
    }
}

/// Operating-mode edge detector. Starts in the idle mode.
#[derive(Debug, Clone)]
pub struct ModeEdge {
    idle: String,
    last: String,
}

impl Default for ModeEdge {
    fn default() -> Self {
        Self::new(PRINT_TYPE_IDLE)
    }
}

impl ModeEdge {
    /// Create a detector treating `idle` as the idle mode code.
    pub fn new(idle: &str) -> Self {
        Self {
            idle: idle.to_string(),
            last: idle.to_string(),
        }
    }

    /// Returns `true` when `mode` is a transition into idle.
    pub fn observe(&mut self, mode: &str) -> bool {
        if mode == self.last {
            return false;
        }
        self.last = mode.to_string();
        self.last == self.idle
    }

    pub fn last(&self) -> &str {
        &self.last
    }
}

/// Thumbnail identity edge detector. Starts with no thumbnail.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailEdge {
    last: Option<String>,
}

impl ThumbnailEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `id` differs from the last observed token.
    pub fn observe(&mut self, id: &str) -> bool {
        if self.last.as_deref() == Some(id) {
            return false;
        }
        self.last = Some(id.to_string());
        true
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}
