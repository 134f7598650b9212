//! Device error code resolution.
//!
//! Maps a print error code to a human-readable description. The mapping is
//! total over `u32`: codes with no table entry resolve to a fallback carrying
//! the code in hexadecimal.

/// Known print error codes, sorted for binary search.
static PRINT_ERRORS: &[(u32, &str)] = &[
    (
        0x0300_4000,
        "Z axis homing failed; the task has been stopped.",
    ),
    (
        0x0300_4001,
        "The printer timed out waiting for the nozzle to cool down before homing.",
    ),
    (
        0x0300_4002,
        "Auto bed leveling failed; the task has been stopped.",
    ),
    (0x0300_4005, "The nozzle fan speed is abnormal."),
    (
        0x0300_400A,
        "Mechanical resonance frequency identification failed.",
    ),
    (0x0300_400C, "The task was canceled."),
    (0x0300_400D, "Resume failed after power loss."),
    (0x0300_8001, "Printing was paused by the user."),
    (
        0x0300_8002,
        "First layer defects were detected by the Micro Lidar.",
    ),
    (
        0x0300_8003,
        "Spaghetti defects were detected by the AI Print Monitoring.",
    ),
    (0x0300_8004, "Filament ran out; please load new filament."),
    (0x0300_8005, "The toolhead front cover fell off."),
    (0x0300_8006, "The build plate marker was not detected."),
    (
        0x0300_8007,
        "There was an unfinished print job when the printer lost power.",
    ),
    (
        0x0300_8008,
        "Printing stopped because the nozzle temperature was abnormal.",
    ),
    (0x0300_8009, "The heatbed temperature is abnormal."),
    (
        0x0300_800A,
        "A foreign object was detected on the build plate.",
    ),
    (
        0x0300_800E,
        "The print file is not available; check the storage media.",
    ),
    (0x0300_8010, "The hotend cooling fan speed is abnormal."),
    (0x0500_4001, "Failed to connect to the cloud service."),
    (0x0500_4002, "Unsupported print file path or name."),
    (
        0x0500_4003,
        "Printing stopped because the print file could not be parsed.",
    ),
    (
        0x0500_4004,
        "The device is busy and cannot start a new task.",
    ),
    (
        0x0500_4006,
        "There is not enough free storage space for the print job.",
    ),
    (0x0500_4014, "Slicing for the print job failed."),
    (0x0500_8030, "The door was opened during the print."),
    (
        0x0700_4001,
        "The AMS is disabled; please load filament from the spool holder.",
    ),
    (0x0700_8001, "Failed to cut the filament; check the cutter."),
    (
        0x0700_8002,
        "The cutter is stuck; make sure the cutter handle is out.",
    ),
    (
        0x0700_8003,
        "Failed to pull out the filament from the extruder.",
    ),
    (
        0x0700_8004,
        "Failed to pull back the filament from the toolhead to the AMS.",
    ),
    (0x0700_8005, "Failed to feed the filament outside the AMS."),
    (0x0700_8006, "Unable to feed filament into the extruder."),
    (
        0x0700_8007,
        "Failed to extrude the filament; the extruder may be clogged.",
    ),
    (0x0700_8010, "The AMS assist motor is overloaded."),
    (0x0700_8011, "AMS filament ran out."),
    (0x0700_8012, "Failed to get the AMS mapping table."),
    (0x0700_8013, "Timed out purging the old filament."),
    (0x0C00_4001, "The Micro Lidar camera is offline."),
    (
        0x0C00_8001,
        "Possible defects were detected in the first layer.",
    ),
    (
        0x0C00_8005,
        "Purged filament has piled up in the waste chute.",
    ),
    (
        0x1200_8001,
        "Failed to cut the filament while changing filament.",
    ),
];

/// Look up the table description for `code`, if one exists.
pub fn describe(code: u32) -> Option<&'static str> {
    PRINT_ERRORS
        .binary_search_by_key(&code, |&(c, _)| c)
        .ok()
        .map(|pos| PRINT_ERRORS[pos].1)
}

/// Resolve `code` to a description. Never fails.
pub fn resolve(code: u32) -> String {
    match describe(code) {
        Some(description) => description.to_string(),
        None => format!("Unknown error {code:x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(PRINT_ERRORS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn known_code_resolves_to_table_entry() {
        assert_eq!(resolve(0x0300_400C), "The task was canceled.");
        assert_eq!(describe(0x0700_8011), Some("AMS filament ran out."));
    }

    #[test]
    fn unknown_code_falls_back_to_hex() {
        let description = resolve(0xDEAD_BEEF);
        assert!(
            description.starts_with("Unknown error"),
            "got: {description}"
        );
        assert!(description.contains("deadbeef"), "got: {description}");
    }

    #[test]
    fn resolve_is_total_at_domain_edges() {
        assert_eq!(resolve(1), "Unknown error 1");
        assert_eq!(resolve(u32::MAX), "Unknown error ffffffff");
        assert!(describe(0).is_none());
    }
}
