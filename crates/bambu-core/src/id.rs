use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Identifies a slot-level sensor entity (AMS unit header or the virtual
    /// tray's header) in the entity registry.
    pub struct SlotId;

    /// Identifies a filament tray in the entity registry.
    pub struct TrayId;
}

/// Stable composite key of a slot-level sensor entity.
///
/// Renders as `AMS#<unit>` for AMS units and `Tray#<tray>` for the virtual
/// tray header that stands in for a slot when no AMS is attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotKey {
    Ams(String),
    Virtual(String),
}

impl SlotKey {
    pub fn ams(unit: impl Into<String>) -> Self {
        SlotKey::Ams(unit.into())
    }

    pub fn virtual_tray(tray: impl Into<String>) -> Self {
        SlotKey::Virtual(tray.into())
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKey::Ams(unit) => write!(f, "AMS#{unit}"),
            SlotKey::Virtual(tray) => write!(f, "Tray#{tray}"),
        }
    }
}

/// Stable composite key of a filament tray.
///
/// Renders as `single[<unit>]tray[<tray>]` inside an AMS unit and
/// `Tray#<tray>` for the single virtual tray.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrayKey {
    Ams { unit: String, tray: String },
    Virtual(String),
}

impl TrayKey {
    pub fn ams(unit: impl Into<String>, tray: impl Into<String>) -> Self {
        TrayKey::Ams {
            unit: unit.into(),
            tray: tray.into(),
        }
    }

    pub fn virtual_tray(tray: impl Into<String>) -> Self {
        TrayKey::Virtual(tray.into())
    }
}

impl fmt::Display for TrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrayKey::Ams { unit, tray } => write!(f, "single[{unit}]tray[{tray}]"),
            TrayKey::Virtual(tray) => write!(f, "Tray#{tray}"),
        }
    }
}
