#![no_main]
use bambu_core::dashboard::Dashboard;
use bambu_core::snapshot::Snapshot;
use bambu_core::test_utils::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary JSON device reports. Decoding may fail; merging whatever
    // decodes must not panic.
    let Ok(snapshot) = serde_json::from_slice::<Snapshot>(data) else {
        return;
    };
    let mut session = FakeSession::new("fuzz");
    session.full = Some(snapshot.clone());
    session.push_status(snapshot);
    let mut dash = Dashboard::new(session, RecordingSink::default());
    dash.activate();
    dash.update();
    dash.update();
    let _ = dash.title_line();
});
