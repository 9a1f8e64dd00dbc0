use super::*;
use crate::{
    config::DeviceConfig,
    display::DisplayGatekeeper,
    render::{RecordingToolkit, Toolkit},
    screen::ScreenContext,
    time::ManualClock,
};

struct Rig {
    display: DisplayGatekeeper<RecordingToolkit>,
    clock: ManualClock,
    config: DeviceConfig,
}

impl Rig {
    fn new(toolkit: Option<RecordingToolkit>) -> Self {
        Self {
            display: DisplayGatekeeper::new(toolkit),
            clock: ManualClock::new(0).with_read_step_ms(1),
            config: DeviceConfig::default(),
        }
    }

    fn ctx(&self) -> ScreenContext<'_, RecordingToolkit, ManualClock> {
        ScreenContext::new(&self.display, &self.clock, &self.config)
    }
}

fn online() -> DeviceStatus {
    DeviceStatus {
        wifi: WifiStatus::Connected,
        ..DeviceStatus::default()
    }
}

#[test]
fn descriptors_are_keyed_by_kind() {
    for kind in AppKind::ALL {
        assert_eq!(kind.descriptor().kind, kind);
        assert_eq!(AppKind::ALL[kind.index()], kind);
    }
    assert_eq!(AppKind::SmartResponse.descriptor().title, "Smart Response");
    assert_eq!(AppKind::MindMate.descriptor().title, "MindMate");
}

#[test]
fn launching_an_app_stops_the_other_one() {
    let rig = Rig::new(Some(RecordingToolkit::new()));
    let mut apps = Apps::<RecordingToolkit>::new();

    apps.launch(AppKind::SmartResponse, &rig.ctx(), &online());
    assert_eq!(apps.foreground(), Some(AppKind::SmartResponse));

    apps.launch(AppKind::MindMate, &rig.ctx(), &online());
    assert!(!apps.is_running(AppKind::SmartResponse));
    assert!(apps.is_running(AppKind::MindMate));
    assert_eq!(apps.foreground(), Some(AppKind::MindMate));
    assert_eq!(apps.show_count(AppKind::SmartResponse), 1);
    assert_eq!(apps.show_count(AppKind::MindMate), 1);
}

#[test]
fn show_builds_the_panel_once_and_writes_the_status_line() {
    let rig = Rig::new(Some(RecordingToolkit::new()));
    let mut apps = Apps::<RecordingToolkit>::new();

    apps.launch(AppKind::SmartResponse, &rig.ctx(), &online());
    apps.stop(AppKind::SmartResponse);
    apps.launch(AppKind::SmartResponse, &rig.ctx(), &online());

    let toolkit = rig.display.try_acquire().unwrap();
    assert_eq!(toolkit.surface_count(), 1);
    let surface = toolkit.active().unwrap();
    assert!(toolkit.find_text(surface, "Smart Response").is_some());
    assert!(toolkit.find_text(surface, "Listening...").is_some());
    assert_eq!(apps.show_count(AppKind::SmartResponse), 2);
}

#[test]
fn updates_only_reach_running_apps() {
    let rig = Rig::new(Some(RecordingToolkit::new()));
    let mut apps = Apps::<RecordingToolkit>::new();

    apps.update_running(&rig.ctx(), &online());
    assert_eq!(apps.get(AppKind::MindMate).update_count(), 0);

    apps.launch(AppKind::MindMate, &rig.ctx(), &online());
    let after_show = apps.get(AppKind::MindMate).update_count();
    assert_eq!(after_show, 1);

    apps.update_running(&rig.ctx(), &online());
    assert_eq!(apps.get(AppKind::MindMate).update_count(), after_show);

    rig.clock.advance_ms(1_000);
    apps.update_running(&rig.ctx(), &online());
    assert_eq!(apps.get(AppKind::MindMate).update_count(), after_show + 1);
    assert_eq!(apps.get(AppKind::SmartResponse).update_count(), 0);

    apps.stop(AppKind::MindMate);
    rig.clock.advance_ms(1_000);
    apps.update_running(&rig.ctx(), &online());
    assert_eq!(apps.get(AppKind::MindMate).update_count(), after_show + 1);
}

#[test]
fn session_timer_counts_from_launch() {
    let rig = Rig::new(Some(RecordingToolkit::new()));
    let mut apps = Apps::<RecordingToolkit>::new();

    apps.launch(AppKind::SmartResponse, &rig.ctx(), &DeviceStatus::default());
    rig.clock.advance_ms(65_000);
    apps.update_running(&rig.ctx(), &DeviceStatus::default());

    let toolkit = rig.display.try_acquire().unwrap();
    let surface = toolkit.active().unwrap();
    assert!(toolkit.find_text(surface, "01:05").is_some());
    assert!(toolkit.find_text(surface, "Waiting for network").is_some());
}

#[test]
fn apps_run_headless_without_a_display() {
    let rig = Rig::new(None);
    let mut apps = Apps::<RecordingToolkit>::new();

    apps.launch(AppKind::MindMate, &rig.ctx(), &online());

    assert!(apps.is_running(AppKind::MindMate));
    assert_eq!(apps.get(AppKind::MindMate).update_count(), 1);
}
