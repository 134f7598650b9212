#![no_main]
use arbitrary::Arbitrary;
use bambu_core::command_queue::Command;
use bambu_core::dashboard::Dashboard;
use bambu_core::device::{ControlCommand, SpeedLevel};
use bambu_core::snapshot::*;
use bambu_core::test_utils::*;
use libfuzzer_sys::fuzz_target;

/// A structured tray update.
#[derive(Arbitrary, Debug)]
struct FuzzTray {
    unit: u8,
    tray: u8,
    filament: Option<u8>,
    color: Option<String>,
}

/// One sparse snapshot's worth of fields.
#[derive(Arbitrary, Debug)]
struct FuzzReport {
    percent: Option<u32>,
    remaining: Option<u32>,
    layer: Option<u32>,
    bed: Option<f64>,
    speed: Option<u32>,
    mode: Option<String>,
    error: Option<u32>,
    humidity: Option<String>,
    unit_temp: Option<String>,
    trays: Vec<FuzzTray>,
    light: Option<String>,
}

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Status(FuzzReport),
    Full(FuzzReport),
    Thumbnail { id: u8 },
    Activate,
    Issue { speed: u32, clear: bool },
    Update,
}

/// Top-level fuzz input: a sequence of operations.
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    ops: Vec<FuzzOp>,
}

const FILAMENTS: [&str; 3] = ["GFA00", "GFL99", "XXX00"];

fn build_report(report: &FuzzReport) -> PrintReport {
    let mut units: Vec<AmsUnitReport> = Vec::new();
    for t in &report.trays {
        let unit_id = (t.unit % 4).to_string();
        let idx = t.filament.map(|f| FILAMENTS[usize::from(f) % FILAMENTS.len()]);
        let entry = tray(&(t.tray % 4).to_string(), idx, t.color.as_deref());
        match units.iter_mut().find(|u| u.id == unit_id) {
            Some(unit) => unit.trays.push(entry),
            None => {
                let mut unit = ams_unit(&unit_id, vec![entry]);
                unit.humidity.clone_from(&report.humidity);
                unit.temp.clone_from(&report.unit_temp);
                units.push(unit);
            }
        }
    }
    PrintReport {
        mc_percent: report.percent,
        mc_remaining_time: report.remaining,
        layer_num: report.layer,
        bed_temper: report.bed,
        spd_lvl: report.speed,
        print_type: report.mode.clone(),
        print_error: report.error,
        lights_report: report
            .light
            .iter()
            .map(|mode| LightReport {
                node: "chamber_light".into(),
                mode: mode.clone(),
            })
            .collect(),
        ..ams_report(units)
    }
}

fuzz_target!(|input: FuzzInput| {
    let mut dash = Dashboard::new(FakeSession::new("fuzz"), RecordingSink::default());

    // Limit operations to prevent timeouts.
    let max_ops = input.ops.len().min(200);

    for op in &input.ops[..max_ops] {
        match op {
            FuzzOp::Status(report) => dash
                .session_mut()
                .push_status(snapshot(build_report(report))),
            FuzzOp::Full(report) => {
                dash.session_mut().full = Some(snapshot(build_report(report)));
            }
            FuzzOp::Thumbnail { id } => dash
                .session_mut()
                .push_thumbnail(thumbnail(&id.to_string(), i64::from(*id))),
            FuzzOp::Activate => dash.activate(),
            FuzzOp::Issue { speed, clear } => {
                dash.issue(Command::SetSpeed(SpeedLevel::from_level(*speed)));
                dash.issue(Command::Control(ControlCommand::Pause));
                if *clear {
                    dash.issue(Command::ClearError);
                }
            }
            FuzzOp::Update => {
                let report = dash.update();
                assert!(dash.state().percent.is_none_or(|p| p <= 100));
                assert!(report.notifications.len() <= 4);
            }
        }
    }

    let _ = dash.title_line();
    let _ = dash.status_summary();
});
