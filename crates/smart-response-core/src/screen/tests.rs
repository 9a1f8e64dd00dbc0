use proptest::prelude::*;

use super::*;
use crate::{
    app::AppKind,
    display::DisplayGuard,
    network::WifiStatus,
    peripherals::{BatteryReading, DateTime},
    render::{RecordingToolkit, Toolkit},
    time::ManualClock,
};

struct Rig {
    display: DisplayGatekeeper<RecordingToolkit>,
    clock: ManualClock,
    config: DeviceConfig,
}

impl Rig {
    fn new() -> Self {
        Self::with_toolkit(Some(RecordingToolkit::new()))
    }

    fn headless() -> Self {
        Self::with_toolkit(None)
    }

    fn with_toolkit(toolkit: Option<RecordingToolkit>) -> Self {
        Self {
            display: DisplayGatekeeper::new(toolkit),
            clock: ManualClock::new(0).with_read_step_ms(1),
            config: DeviceConfig::default(),
        }
    }

    fn ctx(&self) -> ScreenContext<'_, RecordingToolkit, ManualClock> {
        ScreenContext::new(&self.display, &self.clock, &self.config)
    }

    fn toolkit(&self) -> DisplayGuard<'_, RecordingToolkit> {
        self.display.try_acquire().unwrap()
    }
}

fn status_at(hour: u8, minute: u8, second: u8) -> DeviceStatus {
    DeviceStatus {
        time: Some(DateTime {
            year: 2026,
            month: 10,
            day: 19,
            hour,
            minute,
            second,
        }),
        battery: Some(BatteryReading::new(64, false)),
        wifi: WifiStatus::Connected,
    }
}

#[test]
fn init_is_idempotent() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();

    assert!(screens.init(ScreenId::Loading, &rig.ctx()));
    let (surfaces, elements) = {
        let toolkit = rig.toolkit();
        (toolkit.surface_count(), toolkit.element_count())
    };
    assert!(screens.init(ScreenId::Loading, &rig.ctx()));

    let toolkit = rig.toolkit();
    assert_eq!(surfaces, 1);
    assert_eq!(toolkit.surface_count(), surfaces);
    assert_eq!(toolkit.element_count(), elements);
}

#[test]
fn showing_a_screen_hides_the_previous_one() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();
    let status = DeviceStatus::default();

    assert!(screens.show(ScreenId::Loading, &rig.ctx(), &status));
    assert!(screens.show(ScreenId::Standby, &rig.ctx(), &status));

    assert!(!screens.is_visible(ScreenId::Loading));
    assert!(screens.is_visible(ScreenId::Standby));
    assert_eq!(screens.active(), Some(ScreenId::Standby));
    assert_eq!(screens.visible_count(), 1);
    assert_eq!(
        screens.state(ScreenId::Loading).phase(),
        ScreenPhase::Hidden
    );
    assert_eq!(
        screens.state(ScreenId::Launcher).phase(),
        ScreenPhase::Uninitialized
    );
}

#[test]
fn showing_the_active_screen_again_is_a_no_op() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();
    let status = DeviceStatus::default();

    screens.show(ScreenId::Launcher, &rig.ctx(), &status);
    let loads = rig.toolkit().load_count();
    screens.show(ScreenId::Launcher, &rig.ctx(), &status);

    assert_eq!(rig.toolkit().load_count(), loads);
}

#[test]
fn failed_load_keeps_the_previous_screen_active() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();
    let status = DeviceStatus::default();
    screens.show(ScreenId::Standby, &rig.ctx(), &status);
    screens.init(ScreenId::Launcher, &rig.ctx());

    let held = rig.toolkit();
    assert!(!screens.show(ScreenId::Launcher, &rig.ctx(), &status));
    drop(held);

    assert_eq!(screens.active(), Some(ScreenId::Standby));
    assert!(screens.is_visible(ScreenId::Standby));
    assert!(!screens.is_visible(ScreenId::Launcher));
    assert_eq!(screens.visible_count(), 1);

    assert!(screens.show(ScreenId::Launcher, &rig.ctx(), &status));
    assert_eq!(screens.active(), Some(ScreenId::Launcher));
    assert!(!screens.is_visible(ScreenId::Standby));
}

#[test]
fn hiding_a_hidden_screen_changes_nothing() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();
    let status = DeviceStatus::default();

    screens.show(ScreenId::Standby, &rig.ctx(), &status);
    screens.hide(ScreenId::Launcher);

    assert_eq!(screens.active(), Some(ScreenId::Standby));
    assert!(screens.is_visible(ScreenId::Standby));
}

#[test]
fn loading_progress_is_clamped() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();
    screens.show(ScreenId::Loading, &rig.ctx(), &DeviceStatus::default());

    let loading = screens.loading_mut();
    assert_eq!(loading.set_progress(&rig.ctx(), 150), 100);
    assert_eq!(loading.progress(), 100);
    assert_eq!(loading.set_progress(&rig.ctx(), -5), 0);
    assert_eq!(clamp_percent(55), 55);
}

#[test]
fn loading_show_resets_message_and_progress() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();
    let status = DeviceStatus::default();

    screens.show(ScreenId::Loading, &rig.ctx(), &status);
    screens.loading_mut().set_message(&rig.ctx(), "Loading config");
    screens.loading_mut().set_progress(&rig.ctx(), 70);
    screens.show(ScreenId::Standby, &rig.ctx(), &status);
    screens.show(ScreenId::Loading, &rig.ctx(), &status);

    assert_eq!(screens.loading().message(), LOADING_INITIAL_MESSAGE);
    assert_eq!(screens.loading().progress(), 0);
    let toolkit = rig.toolkit();
    let surface = toolkit.active().unwrap();
    assert!(toolkit.find_text(surface, LOADING_INITIAL_MESSAGE).is_some());
}

#[test]
fn loading_spinner_advances_only_while_visible() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();
    let status = DeviceStatus::default();

    screens.loading_mut().update(&rig.ctx());
    assert_eq!(screens.loading().spinner_angle(), 0);

    screens.show(ScreenId::Loading, &rig.ctx(), &status);
    screens.update_visible(&rig.ctx(), &status);
    assert_eq!(screens.loading().spinner_angle(), 5);
}

#[test]
fn standby_refresh_is_throttled() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();
    let status = status_at(8, 30, 5);

    screens.show(ScreenId::Standby, &rig.ctx(), &status);
    assert_eq!(screens.standby().refreshes(), 1);

    screens.update_visible(&rig.ctx(), &status);
    assert_eq!(screens.standby().refreshes(), 1);

    rig.clock.advance_ms(1_000);
    screens.update_visible(&rig.ctx(), &status_at(8, 30, 6));
    assert_eq!(screens.standby().refreshes(), 2);

    let toolkit = rig.toolkit();
    let surface = toolkit.active().unwrap();
    assert!(toolkit.find_text(surface, "08:30:06").is_some());
    assert!(toolkit.find_text(surface, "2026-10-19").is_some());
    assert!(toolkit.find_text(surface, "64%").is_some());
    assert!(toolkit.find_text(surface, "Online").is_some());
}

#[test]
fn standby_update_while_hidden_does_nothing() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();
    let status = status_at(1, 2, 3);

    screens.show(ScreenId::Standby, &rig.ctx(), &status);
    screens.show(ScreenId::Launcher, &rig.ctx(), &status);
    let writes = rig.toolkit().write_count();
    rig.clock.advance_ms(5_000);
    screens.update_visible(&rig.ctx(), &status);

    assert_eq!(rig.toolkit().write_count(), writes);
    assert_eq!(screens.standby().refreshes(), 1);
}

#[test]
fn battery_presentation_follows_thresholds() {
    let cases = [
        (BatteryReading::new(10, true), Color::GREEN, Icon::BatteryCharging),
        (BatteryReading::new(51, false), Color::GREEN, Icon::BatteryFull),
        (BatteryReading::new(50, false), Color::YELLOW, Icon::BatteryMedium),
        (BatteryReading::new(21, false), Color::YELLOW, Icon::BatteryMedium),
        (BatteryReading::new(20, false), Color::RED, Icon::BatteryLow),
    ];
    for (reading, color, icon) in cases {
        let (text, got_color, got_icon) = battery_presentation(Some(reading));
        assert_eq!(got_color, color, "level {}", reading.level_percent);
        assert_eq!(got_icon, icon, "level {}", reading.level_percent);
        assert!(text.ends_with('%'));
    }
    assert_eq!(battery_presentation(None).0.as_str(), "--%");
}

#[test]
fn status_line_covers_every_link_state() {
    assert_eq!(status_line(WifiStatus::Connected).0, "Online");
    assert_eq!(status_line(WifiStatus::Connecting).0, "Connecting...");
    assert_eq!(status_line(WifiStatus::Provisioning).0, "Setup mode");
    assert_eq!(status_line(WifiStatus::Offline).0, "Offline");
}

#[test]
fn unavailable_display_turns_every_operation_into_a_no_op() {
    let rig = Rig::headless();
    let mut screens = Screens::<RecordingToolkit>::new();
    let status = DeviceStatus::default();

    assert!(!screens.show(ScreenId::Loading, &rig.ctx(), &status));
    screens.loading_mut().set_message(&rig.ctx(), "Initializing hardware");
    screens.loading_mut().set_progress(&rig.ctx(), 40);
    assert!(!screens.show(ScreenId::Standby, &rig.ctx(), &status));
    screens.update_visible(&rig.ctx(), &status);

    assert_eq!(screens.visible_count(), 0);
    assert_eq!(screens.active(), None);
    assert_eq!(
        screens.state(ScreenId::Standby).phase(),
        ScreenPhase::Uninitialized
    );
}

#[test]
fn element_allocation_failure_leaves_a_degraded_screen_without_duplicates() {
    let rig = Rig::with_toolkit(Some(RecordingToolkit::new().with_element_budget(2)));
    let mut screens = Screens::<RecordingToolkit>::new();

    assert!(screens.init(ScreenId::Loading, &rig.ctx()));
    assert!(screens.init(ScreenId::Loading, &rig.ctx()));
    screens.loading_mut().set_progress(&rig.ctx(), 30);

    let toolkit = rig.toolkit();
    assert_eq!(toolkit.surface_count(), 1);
    assert_eq!(toolkit.element_count(), 2);
}

#[test]
fn busy_display_skips_the_mutation() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();
    let status = DeviceStatus::default();
    screens.show(ScreenId::Loading, &rig.ctx(), &status);

    let held = rig.toolkit();
    screens.loading_mut().set_message(&rig.ctx(), "Loading config");
    drop(held);

    let toolkit = rig.toolkit();
    let surface = toolkit.active().unwrap();
    assert!(toolkit.find_text(surface, "Loading config").is_none());
    assert_eq!(screens.loading().message(), "Loading config");
}

#[test]
fn launcher_hit_testing_maps_taps_to_apps() {
    let rig = Rig::new();
    let mut screens = Screens::<RecordingToolkit>::new();
    let geometry = rig.config.display;

    for kind in AppKind::ALL {
        let rect = LauncherScreen::<RecordingToolkit>::button_rect(geometry, kind);
        let (x, y) = (rect.x + 10, rect.y + 10);
        assert_eq!(screens.launcher().app_at(geometry, x, y), None);
    }

    screens.show(ScreenId::Launcher, &rig.ctx(), &DeviceStatus::default());
    for kind in AppKind::ALL {
        let rect = LauncherScreen::<RecordingToolkit>::button_rect(geometry, kind);
        let center = (
            rect.x + rect.width as i16 / 2,
            rect.y + rect.height as i16 / 2,
        );
        assert_eq!(
            screens.launcher().app_at(geometry, center.0, center.1),
            Some(kind)
        );
    }
    assert_eq!(screens.launcher().app_at(geometry, 0, 0), None);
}

#[test]
fn launcher_buttons_fit_on_screen_without_overlap() {
    let geometry = DeviceConfig::default().display;
    let first = LauncherScreen::<RecordingToolkit>::button_rect(geometry, AppKind::SmartResponse);
    let second = LauncherScreen::<RecordingToolkit>::button_rect(geometry, AppKind::MindMate);

    assert!(first.y + first.height as i16 <= second.y);
    assert!(second.y + second.height as i16 <= geometry.height as i16);
    assert!(first.x >= 0);
}

proptest! {
    #[test]
    fn at_most_one_screen_is_ever_visible(ops in prop::collection::vec((0usize..3, any::<bool>()), 0..48)) {
        let rig = Rig::new();
        let mut screens = Screens::<RecordingToolkit>::new();
        let status = DeviceStatus::default();

        for (index, show) in ops {
            let id = ScreenId::ALL[index];
            if show {
                screens.show(id, &rig.ctx(), &status);
            } else {
                screens.hide(id);
            }

            prop_assert!(screens.visible_count() <= 1);
            match screens.active() {
                Some(active) => prop_assert!(screens.is_visible(active)),
                None => prop_assert_eq!(screens.visible_count(), 0),
            }
        }
    }
}
