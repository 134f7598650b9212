//! Replay runner: drives a dashboard from a recorded session and prints the
//! notifications and the final materialized view.
//!
//! Run with: `cargo run --package bambu-data --example replay -- [session-file] [config-dir]`
//!
//! Without a session file the bundled `x1c_print` recording is replayed.
//!
//! Set `RUST_LOG=debug` to see lifecycle tracing.

use std::error::Error;
use std::path::{Path, PathBuf};

use bambu_core::dashboard::Dashboard;
use bambu_core::event::NotificationKind;
use bambu_data::{ReplaySession, load_dashboard_config};
use tracing_subscriber::EnvFilter;

const BUNDLED: &str = "x1c_print";

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let session_file = args.next().map(PathBuf::from);
    let config_dir = args.next().map_or_else(|| PathBuf::from("."), PathBuf::from);

    let config = load_dashboard_config(&config_dir)?;
    let (session, label) = match session_file {
        Some(path) => (ReplaySession::from_file(&path)?, path.display().to_string()),
        None => {
            let sessions = Path::new(env!("CARGO_MANIFEST_DIR")).join("sessions");
            let session = ReplaySession::from_dir(&sessions, BUNDLED)?;
            (session, BUNDLED.to_string())
        }
    };
    let cycles = session.cycle_count();

    let sink = |kind: NotificationKind, message: &str| {
        println!("  [{kind:?}] {message}");
    };
    let mut dash = Dashboard::with_config(session, sink, config);
    dash.activate();

    println!("=== Replaying {label} ({cycles} cycles) ===");
    while !dash.session().is_finished() {
        let report = dash.update();
        let sections: Vec<String> = report
            .sections
            .dirty_sections()
            .map(|s| format!("{s:?}"))
            .collect();
        println!(
            "cycle {:>3}: {:?}, {} field(s), changed [{}]",
            report.cycle,
            report.lifecycle,
            report.applied,
            sections.join(", ")
        );
        dash.mark_clean();
    }

    let state = dash.state();
    println!("\n{}", dash.title_line());
    println!(
        "Progress: {}",
        state
            .percent
            .map_or_else(|| "indeterminate".to_string(), |p| format!("{p}%"))
    );
    if let Some(remaining) = state.remaining_label() {
        println!("{remaining}");
    }
    if let Some(layer) = dash.layer_label() {
        println!("{layer}");
    }
    println!(
        "Bed {} / {}  Nozzle {} / {}",
        state.bed_label().unwrap_or_default(),
        state.bed_target_label().unwrap_or_default(),
        state.nozzle_label().unwrap_or_default(),
        state.nozzle_target_label().unwrap_or_default(),
    );
    println!("Speed: {}", state.speed_label().unwrap_or("---"));
    let lamp = if state.is_lamp_on() { "on" } else { "off" };
    println!("Chamber light: {lamp}");

    for (slot_id, slot) in dash.registry().slots.iter() {
        let humidity = slot
            .humidity
            .map_or_else(|| "-".to_string(), |h| h.level().to_string());
        let temperature = slot
            .temperature
            .map_or_else(|| "--".to_string(), |t| format!("{t:.1}ºC"));
        println!("{}: {temperature} humidity {humidity}", slot.key);
        for tray in dash.registry().trays_of(slot_id) {
            println!(
                "  {}: {} {}",
                tray.key,
                tray.filament.label(),
                tray.color_hex().unwrap_or_default()
            );
        }
    }

    if let Some(thumbnail) = &state.thumbnail {
        println!(
            "Thumbnail {} updated {}",
            thumbnail.id,
            dash.thumbnail_updated_label().unwrap_or_default()
        );
    }
    println!("\n{}", dash.status_summary());
    println!(
        "Notifications: {} ({} dropped)",
        dash.notifications().len(),
        dash.notifications().dropped_count()
    );
    Ok(())
}
