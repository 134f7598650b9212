//! User-visible notifications and their delivery.
//!
//! Notifications are produced by the transition detectors and handed to an
//! external [`NotificationSink`]. The dashboard also records them in a
//! [`NotificationLog`], a fixed-capacity ring buffer that drops the oldest
//! entry when full.

// ---------------------------------------------------------------------------
// Notification types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    ErrorRaised { device: String, description: String },
    IdleReached { device: String },
}

/// Discriminant tag for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    ErrorRaised,
    IdleReached,
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::ErrorRaised { .. } => NotificationKind::ErrorRaised,
            Notification::IdleReached { .. } => NotificationKind::IdleReached,
        }
    }

    /// Text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Notification::ErrorRaised {
                device,
                description,
            } => format!("{device} error: {description}"),
            Notification::IdleReached { device } => format!("{device}: Printer Idle"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Receives user-visible alerts. Display is up to the implementation.
pub trait NotificationSink {
    fn notify(&mut self, kind: NotificationKind, message: &str);
}

impl<F> NotificationSink for F
where
    F: FnMut(NotificationKind, &str),
{
    fn notify(&mut self, kind: NotificationKind, message: &str) {
        self(kind, message)
    }
}

// ---------------------------------------------------------------------------
// NotificationLog
// ---------------------------------------------------------------------------

/// Ring buffer of delivered notifications.
#[derive(Debug)]
pub struct NotificationLog {
    entries: Vec<Option<Notification>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total notifications ever recorded, including dropped ones.
    total_written: u64,
    /// Notifications overwritten while the log was full.
    dropped: u64,
}

impl NotificationLog {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
            dropped: 0,
        }
    }

    /// Record a notification, overwriting the oldest one when full.
    pub fn push(&mut self, notification: Notification) {
        self.entries[self.head] = Some(notification);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        } else {
            self.dropped += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Notifications dropped because the log was full. Survives
    /// [`clear`](Self::clear).
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.iter().filter(|n| n.kind() == kind).count()
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head is the next write position, which holds the oldest entry
            self.head
        };
        (0..self.len).filter_map(move |offset| {
            self.entries[(start + offset) % self.capacity()].as_ref()
        })
    }

    /// Forget the stored entries. Lifetime counters are kept.
    pub fn clear(&mut self) {
        for slot in &mut self.entries {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(64)
    }
}
