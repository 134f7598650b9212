//! Snapshot lifecycle controller.
//!
//! A [`Dashboard`] owns everything about one device session: the
//! materialized state, the entity registry, the transition detectors, the
//! notification log and the outbound command queue. An external driver
//! calls [`Dashboard::update`] once per cycle; cycles never overlap.
//!
//! # Lifecycle
//!
//! `Unbuilt -> AwaitingFull -> Incremental`, no way back.
//!
//! - **Unbuilt**: `update` is a no-op until [`Dashboard::activate`].
//! - **AwaitingFull**: every cycle asks the session for a full snapshot.
//!   The first one builds the registry, is merged, and moves the dashboard
//!   to `Incremental`. Incremental snapshots are merged while waiting.
//! - **Incremental**: incremental snapshots are merged; the registry is
//!   never rebuilt.
//!
//! Thumbnails are handled on their own stream in both active states.
//!
//! # Cycle phases
//!
//! 1. **Commands** -- forward queued commands to the session.
//! 2. **Baseline** -- apply the full snapshot while awaiting it.
//! 3. **Incremental** -- merge the next incremental snapshot.
//! 4. **Thumbnail** -- swap the image when its identity changed.
//!
//! The error and idle detectors run after every merge, on the merged values.

use crate::command_queue::{self, Command, CommandQueue};
use crate::config::DashboardConfig;
use crate::detect::{ErrorEdge, ErrorTransition, ModeEdge, ThumbnailEdge};
use crate::device_error;
use crate::dirty::DirtySections;
use crate::event::{Notification, NotificationLog, NotificationSink};
use crate::merge::{self, MergeReport};
use crate::registry::EntityRegistry;
use crate::session::DeviceSession;
use crate::snapshot::{Snapshot, ThumbnailUpdate};
use crate::state::MaterializedState;

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Where a [`Dashboard`] is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Not activated yet; cycles do nothing.
    Unbuilt,
    /// Active, waiting for the session's full snapshot.
    AwaitingFull,
    /// Baseline applied; only incremental snapshots are merged.
    Incremental,
}

// ---------------------------------------------------------------------------
// CycleReport
// ---------------------------------------------------------------------------

/// What happened during one [`Dashboard::update`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Cycle number; `0` when the dashboard was not active.
    pub cycle: u64,
    /// Lifecycle state after the cycle.
    pub lifecycle: Lifecycle,
    /// Whether the full snapshot was applied in this cycle.
    pub baseline_applied: bool,
    /// Fields written across all merges of this cycle.
    pub applied: usize,
    /// Commands forwarded to the session.
    pub forwarded: usize,
    /// Whether a thumbnail with a new identity was shown.
    pub thumbnail_changed: bool,
    /// Notifications delivered during this cycle, in order.
    pub notifications: Vec<Notification>,
    /// Sections changed during this cycle only.
    pub sections: DirtySections,
}

impl CycleReport {
    fn new(cycle: u64, lifecycle: Lifecycle) -> Self {
        Self {
            cycle,
            lifecycle,
            baseline_applied: false,
            applied: 0,
            forwarded: 0,
            thumbnail_changed: false,
            notifications: Vec::new(),
            sections: DirtySections::new(),
        }
    }

    fn absorb(&mut self, merge: &MergeReport) {
        self.applied += merge.applied;
        self.sections.absorb(&merge.sections);
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Live view of one device: folds the session's snapshots into a
/// [`MaterializedState`] and delivers notifications to the sink `N`.
pub struct Dashboard<S, N> {
    session: S,
    sink: N,
    config: DashboardConfig,
    lifecycle: Lifecycle,
    state: MaterializedState,
    registry: EntityRegistry,
    error_edge: ErrorEdge,
    mode_edge: ModeEdge,
    thumbnail_edge: ThumbnailEdge,
    notifications: NotificationLog,
    commands: CommandQueue,
    /// Sections changed since the presentation layer last called
    /// [`Dashboard::mark_clean`].
    dirty: DirtySections,
    cycle: u64,
}

impl<S: DeviceSession, N: NotificationSink> Dashboard<S, N> {
    /// Create an unactivated dashboard with the default configuration.
    pub fn new(session: S, sink: N) -> Self {
        Self::with_config(session, sink, DashboardConfig::default())
    }

    /// Create an unactivated dashboard. The state and the idle detector
    /// start at the configured idle code.
    pub fn with_config(session: S, sink: N, config: DashboardConfig) -> Self {
        Self {
            session,
            sink,
            lifecycle: Lifecycle::Unbuilt,
            state: MaterializedState::with_print_type(&config.idle_print_type),
            registry: EntityRegistry::new(),
            error_edge: ErrorEdge::new(),
            mode_edge: ModeEdge::new(&config.idle_print_type),
            thumbnail_edge: ThumbnailEdge::new(),
            notifications: NotificationLog::new(config.notification_capacity),
            commands: CommandQueue::with_max_history(config.command_history),
            dirty: DirtySections::new(),
            cycle: 0,
            config,
        }
    }

    /// Open the gate. Only the first call has an effect.
    pub fn activate(&mut self) {
        if self.lifecycle == Lifecycle::Unbuilt {
            self.lifecycle = Lifecycle::AwaitingFull;
            tracing::debug!(device = self.session.device_name(), "dashboard activated");
        }
    }

    /// Queue a command for forwarding during the next active cycle.
    pub fn issue(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Run one update cycle.
    pub fn update(&mut self) -> CycleReport {
        if self.lifecycle == Lifecycle::Unbuilt {
            return CycleReport::new(0, Lifecycle::Unbuilt);
        }

        self.cycle += 1;
        let span = tracing::debug_span!(
            "update",
            device = self.session.device_name(),
            cycle = self.cycle
        );
        let _enter = span.enter();

        let mut report = CycleReport::new(self.cycle, self.lifecycle);

        // Phase 1: forward queued commands.
        self.phase_commands(&mut report);

        // Phase 2: baseline.
        if self.lifecycle == Lifecycle::AwaitingFull
            && let Some(full) = self.session.get_full_status()
        {
            self.apply_baseline(&full, &mut report);
        }

        // Phase 3: incremental snapshot.
        if let Some(snapshot) = self.session.get_status() {
            let merged = merge::merge(&mut self.state, &mut self.registry, &snapshot);
            report.absorb(&merged);
            self.detect(&mut report);
        }

        // Phase 4: thumbnail stream.
        if let Some(thumbnail) = self.session.get_thumbnail() {
            self.apply_thumbnail(thumbnail, &mut report);
        }

        self.dirty.absorb(&report.sections);
        report.lifecycle = self.lifecycle;
        report
    }

    fn phase_commands(&mut self, report: &mut CycleReport) {
        let error_code = self.session.print_error_code();
        for command in self.commands.drain(self.cycle) {
            if command_queue::forward(&mut self.session, &command, error_code) {
                report.forwarded += 1;
            } else {
                tracing::debug!(?command, "command skipped");
            }
        }
    }

    fn apply_baseline(&mut self, full: &Snapshot, report: &mut CycleReport) {
        let registered = full
            .print
            .as_ref()
            .map_or(0, |print| self.registry.discover(print));
        tracing::debug!(
            slots = self.registry.slots.len(),
            trays = self.registry.trays.len(),
            registered,
            "registry built from full snapshot"
        );

        let merged = merge::merge(&mut self.state, &mut self.registry, full);
        report.absorb(&merged);
        merge::mark_baseline(&mut self.state);
        self.lifecycle = Lifecycle::Incremental;
        report.baseline_applied = true;
        tracing::debug!("baseline applied, switching to incremental");

        self.detect(report);
    }

    fn apply_thumbnail(&mut self, thumbnail: ThumbnailUpdate, report: &mut CycleReport) {
        if !self.thumbnail_edge.observe(&thumbnail.id) {
            return;
        }
        tracing::debug!(id = %thumbnail.id, "thumbnail changed");
        let merged = merge::merge_thumbnail(&mut self.state, thumbnail);
        report.absorb(&merged);
        report.thumbnail_changed = true;
    }

    /// Run the error and idle detectors against the merged state.
    fn detect(&mut self, report: &mut CycleReport) {
        match self.error_edge.observe(self.state.print_error) {
            Some(ErrorTransition::Raised(code)) => {
                let description = device_error::resolve(code);
                tracing::info!(code, %description, "print error raised");
                let device = self.session.device_name().to_string();
                self.deliver(Notification::ErrorRaised { device, description }, report);
            }
            Some(ErrorTransition::Cleared) => tracing::debug!("print error cleared"),
            None => {}
        }

        if self.mode_edge.observe(&self.state.print_type) {
            tracing::info!("printer idle");
            let device = self.session.device_name().to_string();
            self.deliver(Notification::IdleReached { device }, report);
        }
    }

    fn deliver(&mut self, notification: Notification, report: &mut CycleReport) {
        self.sink
            .notify(notification.kind(), &notification.message());
        self.notifications.push(notification.clone());
        report.notifications.push(notification);
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// `Last Updated: <ts>` with the error description appended while an
    /// error is active.
    pub fn title_line(&self) -> String {
        self.state.title_line(&self.config.timestamp_format)
    }

    /// Whether the title should be highlighted as an error.
    pub fn is_error_highlighted(&self) -> bool {
        self.state.has_error()
    }

    /// `Layer N / T` with `T` taken from the session.
    pub fn layer_label(&self) -> Option<String> {
        self.state.layer_label(self.session.total_layer_count())
    }

    /// Multi-line diagnostic summary.
    pub fn status_summary(&self) -> String {
        self.state.status_summary(&self.config.timestamp_format)
    }

    /// When the shown thumbnail was produced.
    pub fn thumbnail_updated_label(&self) -> Option<String> {
        self.state
            .thumbnail_updated_label(&self.config.timestamp_format)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// The merged view of the device.
    pub fn state(&self) -> &MaterializedState {
        &self.state
    }

    /// Slots and trays discovered from the full snapshot.
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Recently delivered notifications.
    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }

    /// Pending commands and forwarding history.
    pub fn commands(&self) -> &CommandQueue {
        &self.commands
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Sections changed since the last [`mark_clean`](Self::mark_clean).
    pub fn dirty(&self) -> &DirtySections {
        &self.dirty
    }

    /// Called by the presentation layer after redrawing.
    pub fn mark_clean(&mut self) {
        self.dirty.mark_clean();
    }

    /// Number of active cycles run so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    /// Give back the session and the sink.
    pub fn into_parts(self) -> (S, N) {
        (self.session, self.sink)
    }
}
