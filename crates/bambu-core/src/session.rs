//! Collaborator contract of the transport/session layer.

use crate::command_queue::CommandSink;
use crate::snapshot::{Snapshot, ThumbnailUpdate};

/// One connected device as seen by the dashboard.
///
/// Retrieval never blocks: an accessor returning `None` means nothing is
/// available this cycle. Outbound commands go through the [`CommandSink`]
/// supertrait and are fire-and-forget.
pub trait DeviceSession: CommandSink {
    /// The most recent complete snapshot, if one was retrieved since
    /// connecting.
    fn get_full_status(&self) -> Option<Snapshot>;

    /// The next incremental snapshot since the last call.
    fn get_status(&mut self) -> Option<Snapshot>;

    /// The latest thumbnail, if its identity differs from the last one
    /// delivered.
    fn get_thumbnail(&mut self) -> Option<ThumbnailUpdate>;

    fn device_name(&self) -> &str;

    fn print_error_code(&self) -> u32;

    fn total_layer_count(&self) -> u32;
}
