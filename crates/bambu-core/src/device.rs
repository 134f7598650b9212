//! Closed device vocabularies: operating modes, lighting, speed levels,
//! control commands, humidity buckets and the filament catalog.

use serde::{Deserialize, Serialize};

/// Operating-mode code reported while the printer has no job.
pub const PRINT_TYPE_IDLE: &str = "idle";

/// Lighting node whose mode drives the monitor lamp.
pub const CHAMBER_LIGHT: &str = "chamber_light";

// ---------------------------------------------------------------------------
// Lighting
// ---------------------------------------------------------------------------

/// Mode of a lighting node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightMode {
    On,
    Off,
    Flashing,
}

impl LightMode {
    pub const ALL: [LightMode; 3] = [LightMode::On, LightMode::Off, LightMode::Flashing];

    /// Value used on the wire and in lights reports.
    pub fn value(self) -> &'static str {
        match self {
            LightMode::On => "on",
            LightMode::Off => "off",
            LightMode::Flashing => "flashing",
        }
    }
}

// ---------------------------------------------------------------------------
// Print control
// ---------------------------------------------------------------------------

/// Job control an operator can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlCommand {
    Stop,
    Pause,
    Resume,
}

impl ControlCommand {
    pub const ALL: [ControlCommand; 3] = [
        ControlCommand::Stop,
        ControlCommand::Pause,
        ControlCommand::Resume,
    ];

    /// Value used on the wire.
    pub fn value(self) -> &'static str {
        match self {
            ControlCommand::Stop => "stop",
            ControlCommand::Pause => "pause",
            ControlCommand::Resume => "resume",
        }
    }
}

// ---------------------------------------------------------------------------
// Speed
// ---------------------------------------------------------------------------

/// Print speed profile. Anything outside 1..=4 maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedLevel {
    Silent,
    Standard,
    Sport,
    Ludicrous,
    Unknown,
}

impl SpeedLevel {
    /// Decode a reported `spd_lvl`.
    pub fn from_level(level: u32) -> Self {
        match level {
            1 => SpeedLevel::Silent,
            2 => SpeedLevel::Standard,
            3 => SpeedLevel::Sport,
            4 => SpeedLevel::Ludicrous,
            _ => SpeedLevel::Unknown,
        }
    }

    /// Numeric level sent to the device; `Unknown` has none.
    pub fn level(self) -> Option<u32> {
        match self {
            SpeedLevel::Silent => Some(1),
            SpeedLevel::Standard => Some(2),
            SpeedLevel::Sport => Some(3),
            SpeedLevel::Ludicrous => Some(4),
            SpeedLevel::Unknown => None,
        }
    }

    /// Display name of the profile.
    pub fn description(self) -> &'static str {
        match self {
            SpeedLevel::Silent => "Silent",
            SpeedLevel::Standard => "Standard",
            SpeedLevel::Sport => "Sport",
            SpeedLevel::Ludicrous => "Ludicrous",
            SpeedLevel::Unknown => "Unknown",
        }
    }

    /// Levels an operator may pick.
    pub fn selectable() -> [SpeedLevel; 4] {
        [
            SpeedLevel::Silent,
            SpeedLevel::Standard,
            SpeedLevel::Sport,
            SpeedLevel::Ludicrous,
        ]
    }
}

// ---------------------------------------------------------------------------
// Humidity
// ---------------------------------------------------------------------------

/// AMS humidity bucket. Level 0 also covers unrecognized readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HumidityLevel(u8);

impl HumidityLevel {
    /// Decode a reported humidity string; only `1`..=`4` are recognized.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "1" => HumidityLevel(1),
            "2" => HumidityLevel(2),
            "3" => HumidityLevel(3),
            "4" => HumidityLevel(4),
            _ => HumidityLevel(0),
        }
    }

    /// Bucket number, `0` when unknown.
    pub fn level(self) -> u8 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Filament catalog
// ---------------------------------------------------------------------------

/// Filament catalog keyed by tray info index, sorted for binary search.
static FILAMENTS: &[(&str, &str)] = &[
    ("GFA00", "Bambu PLA Basic"),
    ("GFA01", "Bambu PLA Matte"),
    ("GFA02", "Bambu PLA Metal"),
    ("GFA05", "Bambu PLA Silk"),
    ("GFA07", "Bambu PLA Marble"),
    ("GFA08", "Bambu PLA Sparkle"),
    ("GFA09", "Bambu PLA Tough"),
    ("GFA50", "Bambu PLA-CF"),
    ("GFB00", "Bambu ABS"),
    ("GFB01", "Bambu ASA"),
    ("GFB50", "Bambu ABS-GF"),
    ("GFB98", "Generic ASA"),
    ("GFB99", "Generic ABS"),
    ("GFC00", "Bambu PC"),
    ("GFC99", "Generic PC"),
    ("GFG00", "Bambu PETG Basic"),
    ("GFG50", "Bambu PETG-CF"),
    ("GFG99", "Generic PETG"),
    ("GFL00", "PolyLite PLA"),
    ("GFL01", "PolyTerra PLA"),
    ("GFL99", "Generic PLA"),
    ("GFN03", "Bambu PA-CF"),
    ("GFN04", "Bambu PAHT-CF"),
    ("GFN99", "Generic PA"),
    ("GFS00", "Bambu Support W"),
    ("GFS01", "Bambu Support G"),
    ("GFS99", "Generic PVA"),
    ("GFT01", "Bambu PET-CF"),
    ("GFU01", "Bambu TPU 95A"),
    ("GFU99", "Generic TPU"),
];

/// Look up a filament name by its tray info index.
pub fn filament_name(tray_info_idx: &str) -> Option<&'static str> {
    FILAMENTS
        .binary_search_by_key(&tray_info_idx, |&(idx, _)| idx)
        .ok()
        .map(|pos| FILAMENTS[pos].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filament_table_is_sorted() {
        assert!(FILAMENTS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn filament_lookup() {
        assert_eq!(filament_name("GFA00"), Some("Bambu PLA Basic"));
        assert_eq!(filament_name("GFU99"), Some("Generic TPU"));
        assert_eq!(filament_name("XYZ"), None);
        assert_eq!(filament_name(""), None);
    }

    #[test]
    fn speed_levels_round_trip_through_level() {
        for speed in SpeedLevel::selectable() {
            let level = speed.level().unwrap();
            assert_eq!(SpeedLevel::from_level(level), speed);
        }
        assert_eq!(SpeedLevel::from_level(0), SpeedLevel::Unknown);
        assert_eq!(SpeedLevel::from_level(9), SpeedLevel::Unknown);
        assert_eq!(SpeedLevel::Unknown.level(), None);
    }

    #[test]
    fn selectable_speeds_exclude_unknown() {
        assert!(!SpeedLevel::selectable().contains(&SpeedLevel::Unknown));
    }

    #[test]
    fn humidity_buckets() {
        assert_eq!(HumidityLevel::from_raw("3").level(), 3);
        assert_eq!(HumidityLevel::from_raw("0").level(), 0);
        assert_eq!(HumidityLevel::from_raw("5").level(), 0);
        assert_eq!(HumidityLevel::from_raw("wet").level(), 0);
    }

    #[test]
    fn light_mode_values() {
        let values: Vec<_> = LightMode::ALL.iter().map(|m| m.value()).collect();
        assert_eq!(values, ["on", "off", "flashing"]);
    }
}
