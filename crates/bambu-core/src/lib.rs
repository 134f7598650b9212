//! Bambu Core -- live telemetry view for a networked 3D printer.
//!
//! The printer pushes sparse status snapshots: any subset of fields may be
//! missing from a given message. This crate folds that stream into one
//! coherent [`state::MaterializedState`] and fires user-visible
//! notifications exactly once per state transition.
//!
//! # Update Cycle
//!
//! Each call to [`dashboard::Dashboard::update`] runs these phases:
//!
//! 1. **Commands** -- Forward queued user commands to the device session.
//! 2. **Baseline** -- While awaiting it, apply the full snapshot once and
//!    build the entity registry from it.
//! 3. **Incremental** -- Merge the next incremental snapshot.
//! 4. **Thumbnail** -- Swap the displayed image when its identity changed.
//!
//! The error and idle detectors run after every merge.
//!
//! # Key Types
//!
//! - [`dashboard::Dashboard`] -- Lifecycle controller and cycle driver.
//! - [`merge::merge`] -- Field-presence merge of one snapshot.
//! - [`registry::EntityRegistry`] -- Arena-backed AMS slot and tray registry
//!   keyed by stable composite keys.
//! - [`detect`] -- Error, operating-mode and thumbnail edge detectors.
//! - [`device_error::resolve`] -- Error code to description.
//! - [`session::DeviceSession`] -- Contract the transport layer implements.
//! - [`event::NotificationLog`] -- Ring log of delivered notifications.

pub mod command_queue;
pub mod config;
pub mod dashboard;
pub mod detect;
pub mod device;
pub mod device_error;
pub mod dirty;
pub mod event;
pub mod format;
pub mod id;
pub mod merge;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
