//! Bambu Data -- file-backed configuration and recorded device sessions.
//!
//! Files are RON, TOML or JSON, picked by extension. Exactly one format may
//! exist per base name in a directory.

pub mod config;
pub mod loader;
pub mod recording;

pub use config::{ConfigError, load_dashboard_config};
pub use loader::DataLoadError;
pub use recording::{RecordedCycle, RecordedSession, ReplaySession, load_named, load_recording};
