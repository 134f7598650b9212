//! Field-presence merge engine.
//!
//! [`merge`] applies a sparse snapshot onto the materialized state and the
//! entity registry. A field is written only when the snapshot carries it;
//! absent fields never regress state. Conflicts resolve last-write-wins by
//! arrival order. Merging the same snapshot twice leaves the same state as
//! merging it once.
//!
//! A view section is reported as changed only when a written value differs
//! from the stored one. The other writes to [`MaterializedState`] that do
//! not come from a snapshot ([`mark_baseline`], [`merge_thumbnail`]) live
//! here too, so the state has a single owner of its mutations.

use crate::device::{CHAMBER_LIGHT, HumidityLevel, SpeedLevel};
use crate::dirty::{DirtySections, Section};
use crate::id::{SlotKey, TrayKey};
use crate::registry::{EntityRegistry, Filament};
use crate::snapshot::{AmsUnitReport, PrintReport, Snapshot, ThumbnailUpdate, VirtualTrayReport};
use crate::state::{MaterializedState, ThumbnailView};

/// Outcome of one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Number of fields written to the state or to registered entities,
    /// whether or not the value changed.
    pub applied: usize,
    /// Sections whose values changed.
    pub sections: DirtySections,
}

impl MergeReport {
    fn section(&mut self, section: Section) -> SectionWrites<'_> {
        SectionWrites {
            report: self,
            section,
        }
    }
}

/// Writes into one view section of a [`MergeReport`].
struct SectionWrites<'a> {
    report: &'a mut MergeReport,
    section: Section,
}

impl SectionWrites<'_> {
    /// Write `value` into `dst`. The section is marked only when the stored
    /// value changes; returns whether it did.
    fn set<T: PartialEq>(&mut self, dst: &mut T, value: T) -> bool {
        self.report.applied += 1;
        if *dst == value {
            return false;
        }
        *dst = value;
        self.report.sections.mark(self.section);
        true
    }

    /// Overwrite `dst` with `src` when present.
    fn apply<T: Clone + PartialEq>(&mut self, dst: &mut Option<T>, src: &Option<T>) {
        if let Some(value) = src {
            self.set(dst, Some(value.clone()));
        }
    }
}

/// Parse a string-encoded reading. Malformed input yields `0.0` and a
/// data-quality warning.
pub fn parse_reading(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(raw, "cannot parse numeric reading, using 0.0");
            0.0
        }
    }
}

/// Merge `snapshot` into `state` and `registry`.
pub fn merge(
    state: &mut MaterializedState,
    registry: &mut EntityRegistry,
    snapshot: &Snapshot,
) -> MergeReport {
    let mut report = MergeReport::default();
    if state.last_updated != Some(snapshot.last_updated) {
        state.last_updated = Some(snapshot.last_updated);
        report.sections.mark(Section::Title);
    }
    if let Some(print) = &snapshot.print {
        merge_print(state, registry, print, &mut report);
    }
    report
}

/// Record that the full snapshot has been applied.
pub fn mark_baseline(state: &mut MaterializedState) {
    state.full_applied = true;
}

/// Show a new thumbnail image. Identity checks are the caller's job.
pub fn merge_thumbnail(state: &mut MaterializedState, thumbnail: ThumbnailUpdate) -> MergeReport {
    let mut report = MergeReport::default();
    let view = ThumbnailView {
        id: thumbnail.id,
        image: thumbnail.image,
        updated: thumbnail.last_updated,
    };
    report
        .section(Section::Thumbnail)
        .set(&mut state.thumbnail, Some(view));
    report
}

fn merge_print(
    state: &mut MaterializedState,
    registry: &mut EntityRegistry,
    print: &PrintReport,
    report: &mut MergeReport,
) {
    let mut progress = report.section(Section::Progress);
    if let Some(percent) = print.mc_percent {
        progress.set(&mut state.percent, Some(percent.min(100)));
    }
    progress.apply(&mut state.remaining_minutes, &print.mc_remaining_time);
    progress.apply(&mut state.gcode_file, &print.gcode_file);
    progress.apply(&mut state.layer_num, &print.layer_num);
    progress.apply(&mut state.total_layer_num, &print.total_layer_num);

    let mut temperatures = report.section(Section::Temperatures);
    temperatures.apply(&mut state.bed_temper, &print.bed_temper);
    temperatures.apply(&mut state.bed_target_temper, &print.bed_target_temper);
    temperatures.apply(&mut state.nozzle_temper, &print.nozzle_temper);
    temperatures.apply(&mut state.nozzle_target_temper, &print.nozzle_target_temper);
    temperatures.apply(&mut state.chamber_temper, &print.chamber_temper);

    let mut speed = report.section(Section::Speed);
    if let Some(level) = print.spd_lvl {
        speed.set(&mut state.speed, Some(SpeedLevel::from_level(level)));
    }

    let mut mode = report.section(Section::Mode);
    if let Some(print_type) = &print.print_type {
        mode.set(&mut state.print_type, print_type.clone());
    }

    // the title line carries the error description
    let mut error = report.section(Section::Error);
    if let Some(code) = print.print_error
        && error.set(&mut state.print_error, code)
    {
        report.sections.mark(Section::Title);
    }

    let mut title = report.section(Section::Title);
    title.apply(&mut state.command, &print.command);
    title.apply(&mut state.sequence_id, &print.sequence_id);

    // AMS units win over the virtual tray
    if let Some(units) = print.ams_units() {
        for unit in units {
            merge_ams_unit(registry, unit, report);
        }
    } else if let Some(tray) = &print.vt_tray {
        merge_virtual_tray(registry, tray, report);
    }

    let mut lamp = report.section(Section::Lamp);
    if let Some(light) = print
        .lights_report
        .iter()
        .find(|lr| lr.node == CHAMBER_LIGHT)
    {
        lamp.set(&mut state.chamber_light, Some(light.mode.clone()));
    }
}

fn merge_ams_unit(registry: &mut EntityRegistry, unit: &AmsUnitReport, report: &mut MergeReport) {
    let mut filaments = report.section(Section::Filaments);
    if let Some(slot) = registry.slots.lookup_mut(&SlotKey::ams(&unit.id)) {
        if let Some(raw) = &unit.temp {
            filaments.set(&mut slot.temperature, Some(parse_reading(raw)));
        }
        if let Some(raw) = &unit.humidity {
            filaments.set(&mut slot.humidity, Some(HumidityLevel::from_raw(raw)));
        }
    }

    for tray in &unit.trays {
        let key = TrayKey::ams(&unit.id, &tray.id);
        let Some(view) = registry.trays.lookup_mut(&key) else {
            continue;
        };
        let filament = Filament::from_index(tray.tray_info_idx.as_deref());
        filaments.set(&mut view.filament, filament);
        // an empty tray keeps its last colour
        if view.filament != Filament::Empty {
            filaments.apply(&mut view.color, &tray.tray_color);
        }
    }
}

fn merge_virtual_tray(
    registry: &mut EntityRegistry,
    tray: &VirtualTrayReport,
    report: &mut MergeReport,
) {
    let mut filaments = report.section(Section::Filaments);
    if let Some(slot) = registry.slots.lookup_mut(&SlotKey::virtual_tray(&tray.id))
        && let Some(raw) = &tray.tray_temp
    {
        filaments.set(&mut slot.temperature, Some(parse_reading(raw)));
    }

    if let Some(view) = registry.trays.lookup_mut(&TrayKey::virtual_tray(&tray.id)) {
        let filament = Filament::from_index(tray.tray_info_idx.as_deref());
        filaments.set(&mut view.filament, filament);
        if view.filament != Filament::Empty {
            filaments.apply(&mut view.color, &tray.tray_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{AmsReport, LightReport, ThumbnailImage, TrayReport};
    use chrono::DateTime;

    fn at(secs: i64) -> chrono::DateTime<chrono::Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn snap(print: PrintReport) -> Snapshot {
        Snapshot::new(print, at(1_700_000_000))
    }

    fn ams_print(trays: Vec<TrayReport>) -> PrintReport {
        PrintReport {
            ams: Some(AmsReport {
                units: vec![AmsUnitReport {
                    id: "0".into(),
                    humidity: Some("2".into()),
                    temp: Some("24.5".into()),
                    trays,
                }],
            }),
            ..Default::default()
        }
    }

    fn tray(id: &str, idx: Option<&str>, color: Option<&str>) -> TrayReport {
        TrayReport {
            id: id.into(),
            tray_info_idx: idx.map(Into::into),
            tray_color: color.map(Into::into),
            tray_type: None,
        }
    }

    #[test]
    fn present_fields_overwrite() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        let report = merge(
            &mut state,
            &mut registry,
            &snap(PrintReport {
                mc_percent: Some(42),
                bed_temper: Some(60.0),
                gcode_file: Some("benchy.gcode".into()),
                ..Default::default()
            }),
        );
        assert_eq!(report.applied, 3);
        assert_eq!(state.percent, Some(42));
        assert_eq!(state.bed_temper, Some(60.0));
        assert_eq!(state.gcode_file.as_deref(), Some("benchy.gcode"));
        assert!(report.sections.is_section_dirty(Section::Progress));
        assert!(report.sections.is_section_dirty(Section::Temperatures));
        assert!(!report.sections.is_section_dirty(Section::Lamp));
    }

    #[test]
    fn absent_fields_leave_state_untouched() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        merge(
            &mut state,
            &mut registry,
            &snap(PrintReport {
                nozzle_temper: Some(215.0),
                spd_lvl: Some(2),
                ..Default::default()
            }),
        );
        let report = merge(
            &mut state,
            &mut registry,
            &snap(PrintReport {
                bed_temper: Some(55.0),
                ..Default::default()
            }),
        );
        assert_eq!(report.applied, 1);
        assert_eq!(state.nozzle_temper, Some(215.0));
        assert_eq!(state.speed, Some(SpeedLevel::Standard));
        assert_eq!(state.bed_temper, Some(55.0));
    }

    #[test]
    fn snapshot_without_print_only_touches_timestamp() {
        let mut state = MaterializedState {
            percent: Some(10),
            ..Default::default()
        };
        let mut registry = EntityRegistry::new();
        let report = merge(
            &mut state,
            &mut registry,
            &Snapshot {
                print: None,
                last_updated: at(5),
            },
        );
        assert_eq!(report.applied, 0);
        assert_eq!(state.percent, Some(10));
        assert_eq!(state.last_updated, Some(at(5)));
    }

    #[test]
    fn percent_is_clamped() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        merge(
            &mut state,
            &mut registry,
            &snap(PrintReport {
                mc_percent: Some(250),
                ..Default::default()
            }),
        );
        assert_eq!(state.percent, Some(100));
    }

    #[test]
    fn later_snapshot_wins_on_conflict() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        for layer in [3, 4, 2] {
            merge(
                &mut state,
                &mut registry,
                &snap(PrintReport {
                    layer_num: Some(layer),
                    ..Default::default()
                }),
            );
        }
        assert_eq!(state.layer_num, Some(2));
    }

    #[test]
    fn chamber_light_only_from_chamber_node() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        merge(
            &mut state,
            &mut registry,
            &snap(PrintReport {
                lights_report: vec![
                    LightReport {
                        node: "work_light".into(),
                        mode: "flashing".into(),
                    },
                    LightReport {
                        node: CHAMBER_LIGHT.into(),
                        mode: "on".into(),
                    },
                ],
                ..Default::default()
            }),
        );
        assert_eq!(state.chamber_light.as_deref(), Some("on"));
        assert!(state.is_lamp_on());
    }

    #[test]
    fn ams_readings_merge_into_registered_entities() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        let print = ams_print(vec![tray("0", Some("GFA00"), Some("FF6A13FF"))]);
        registry.discover(&print);

        let report = merge(&mut state, &mut registry, &snap(print));
        assert_eq!(report.applied, 4);

        let slot = registry.slots.lookup(&SlotKey::ams("0")).unwrap();
        assert_eq!(slot.temperature, Some(24.5));
        assert_eq!(slot.humidity.map(|h| h.level()), Some(2));

        let view = registry.trays.lookup(&TrayKey::ams("0", "0")).unwrap();
        assert_eq!(view.filament.label(), "Bambu PLA Basic");
        assert_eq!(view.color_hex().as_deref(), Some("#FF6A13FF"));
    }

    #[test]
    fn empty_tray_renders_empty_and_keeps_color() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        let loaded = ams_print(vec![tray("0", Some("GFB00"), Some("000000FF"))]);
        registry.discover(&loaded);
        merge(&mut state, &mut registry, &snap(loaded));

        merge(
            &mut state,
            &mut registry,
            &snap(ams_print(vec![tray("0", None, Some("FFFFFFFF"))])),
        );
        let view = registry.trays.lookup(&TrayKey::ams("0", "0")).unwrap();
        assert_eq!(view.filament, Filament::Empty);
        assert_eq!(view.filament.label(), "Empty");
        assert_eq!(view.color.as_deref(), Some("000000FF"));
    }

    #[test]
    fn unregistered_entities_are_ignored() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        let print = ams_print(vec![tray("0", Some("GFA00"), Some("FF0000FF"))]);
        let report = merge(&mut state, &mut registry, &snap(print));
        assert_eq!(report.applied, 0);
        assert!(registry.slots.is_empty());
        assert!(registry.trays.is_empty());
    }

    #[test]
    fn malformed_temperature_becomes_zero() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        let mut print = ams_print(vec![]);
        registry.discover(&print);
        if let Some(ams) = print.ams.as_mut() {
            ams.units[0].temp = Some("n/a".into());
        }
        merge(&mut state, &mut registry, &snap(print));
        let slot = registry.slots.lookup(&SlotKey::ams("0")).unwrap();
        assert_eq!(slot.temperature, Some(0.0));
    }

    #[test]
    fn virtual_tray_merges_into_synthetic_slot() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        let print = PrintReport {
            vt_tray: Some(VirtualTrayReport {
                id: "254".into(),
                tray_temp: Some("31.0".into()),
                tray_info_idx: Some("GFL99".into()),
                tray_color: Some("00FF00FF".into()),
            }),
            ..Default::default()
        };
        registry.discover(&print);
        merge(&mut state, &mut registry, &snap(print));

        let slot = registry.slots.lookup(&SlotKey::virtual_tray("254")).unwrap();
        assert_eq!(slot.temperature, Some(31.0));
        let view = registry.trays.lookup(&TrayKey::virtual_tray("254")).unwrap();
        assert_eq!(view.filament.label(), "Generic PLA");
        assert_eq!(view.color.as_deref(), Some("00FF00FF"));
    }

    #[test]
    fn merge_is_idempotent() {
        let print = PrintReport {
            mc_percent: Some(50),
            print_type: Some("cloud".into()),
            print_error: Some(7),
            ..ams_print(vec![tray("0", Some("GFA01"), Some("112233FF"))])
        };
        let mut registry = EntityRegistry::new();
        registry.discover(&print);
        let snapshot = snap(print);

        let mut once = MaterializedState::new();
        let mut once_registry = registry.clone();
        merge(&mut once, &mut once_registry, &snapshot);

        let mut twice = MaterializedState::new();
        let mut twice_registry = registry;
        merge(&mut twice, &mut twice_registry, &snapshot);
        merge(&mut twice, &mut twice_registry, &snapshot);

        assert_eq!(once, twice);
        let a: Vec<_> = once_registry.trays.iter().map(|(_, t)| t.clone()).collect();
        let b: Vec<_> = twice_registry.trays.iter().map(|(_, t)| t.clone()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn unchanged_values_mark_no_section() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        let print = PrintReport {
            mc_percent: Some(10),
            print_error: Some(7),
            ..ams_print(vec![tray("0", Some("GFA00"), Some("FF0000FF"))])
        };
        registry.discover(&print);
        let first = merge(&mut state, &mut registry, &snap(print.clone()));
        assert!(first.sections.is_section_dirty(Section::Filaments));

        let again = merge(&mut state, &mut registry, &snap(print));
        assert_eq!(again.applied, first.applied);
        assert!(!again.sections.is_dirty());
    }

    #[test]
    fn new_timestamp_marks_title() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        let bed = |temp| PrintReport {
            bed_temper: Some(temp),
            ..Default::default()
        };
        merge(&mut state, &mut registry, &snap(bed(60.0)));

        let later = Snapshot::new(bed(60.0), at(1_700_003_600));
        let report = merge(&mut state, &mut registry, &later);
        let sections: Vec<Section> = report.sections.dirty_sections().collect();
        assert_eq!(sections, [Section::Title]);
    }

    #[test]
    fn error_change_marks_title() {
        let mut state = MaterializedState::new();
        let mut registry = EntityRegistry::new();
        let report = merge(
            &mut state,
            &mut registry,
            &snap(PrintReport {
                print_error: Some(0x0300_400C),
                ..Default::default()
            }),
        );
        assert!(report.sections.is_section_dirty(Section::Error));
        assert!(report.sections.is_section_dirty(Section::Title));
    }

    #[test]
    fn thumbnail_merge_replaces_image() {
        let mut state = MaterializedState::new();
        let update = ThumbnailUpdate {
            id: "plate_1".into(),
            image: ThumbnailImage::Ref("plate_1.png".into()),
            last_updated: at(60),
        };
        let report = merge_thumbnail(&mut state, update.clone());
        assert!(report.sections.is_section_dirty(Section::Thumbnail));
        assert_eq!(state.thumbnail.as_ref().map(|t| t.updated), Some(at(60)));
        assert!(!merge_thumbnail(&mut state, update).sections.is_dirty());

        mark_baseline(&mut state);
        assert!(state.full_applied);
    }

    #[test]
    fn parse_reading_accepts_whitespace() {
        assert_eq!(parse_reading(" 21.5 "), 21.5);
        assert_eq!(parse_reading(""), 0.0);
    }
}
