use embassy_futures::{block_on, join::join};

use super::*;
use crate::{
    app::AppKind,
    boot::BootOrchestrator,
    config::DeviceConfig,
    input::InputEvent,
    network::{LinkScript, ScriptedNetwork},
    render::RecordingToolkit,
    screen::{LauncherScreen, ScreenId},
    settings::MemoryConfigStore,
    testkit::{CallLog, FALLBACK_SSID, Failures, TestBoard, call_log, device_state, hardware},
    ui::Foreground,
};

fn reachable() -> ScriptedNetwork {
    ScriptedNetwork::new().with_network(FALLBACK_SSID, LinkScript::Accept)
}

fn booted_state(
    log: &CallLog,
    input: &'static [InputEvent],
    failures: Failures,
) -> DeviceState<TestBoard> {
    let state = device_state(true);
    let hw = hardware(log, MemoryConfigStore::new(), reachable(), input, failures);
    block_on(BootOrchestrator::new(&state).run(hw));
    state
}

fn position(log: &CallLog, entry: &str) -> Option<usize> {
    log.borrow().iter().position(|e| e == entry)
}

#[test]
fn loop_waits_for_readiness() {
    let state = device_state(true);
    let mut event_loop = EventLoop::new(&state);

    assert_eq!(block_on(event_loop.tick()), TickOutcome::WaitingForBoot);
    assert_eq!(event_loop.ticks(), 0);
    assert!(event_loop.hardware().is_none());
    assert_eq!(
        state.clock().slept_ms(),
        state.config().event_loop.ready_poll_ms
    );
}

#[test]
fn no_peripheral_is_touched_by_the_loop_before_boot_finishes() {
    let log = call_log();
    let state = device_state(true);
    let hw = hardware(
        &log,
        MemoryConfigStore::new(),
        reachable(),
        &[],
        Failures::default(),
    );

    let ticks = async {
        let mut event_loop = EventLoop::new(&state);
        let mut waited = 0u32;
        loop {
            match event_loop.tick().await {
                TickOutcome::WaitingForBoot => {
                    waited += 1;
                    assert!(position(&log, "battery.update").is_none());
                    assert!(position(&log, "audio.process").is_none());
                }
                TickOutcome::Serviced { .. } => break,
            }
        }
        (waited, event_loop.hardware().map(|hw| hw.network.handle_calls()))
    };

    let (report, (waited, handle_calls)) =
        block_on(join(BootOrchestrator::new(&state).run(hw), ticks));

    assert!(report.network.is_connected());
    assert!(waited > 0);
    assert_eq!(handle_calls, Some(1));
    let ready_at = position(&log, "audio.init").unwrap();
    assert!(position(&log, "battery.update").unwrap() > ready_at);
    assert!(position(&log, "audio.process").unwrap() > ready_at);
}

#[test]
fn serviced_tick_polls_battery_network_and_audio() {
    let log = call_log();
    let state = booted_state(&log, &[], Failures::default());
    let mut event_loop = EventLoop::new(&state);

    assert_eq!(
        block_on(event_loop.tick()),
        TickOutcome::Serviced { events: 0 }
    );
    block_on(event_loop.tick());

    let calls = log.borrow();
    assert_eq!(calls.iter().filter(|e| *e == "battery.update").count(), 2);
    assert_eq!(calls.iter().filter(|e| *e == "audio.process").count(), 2);
    drop(calls);
    let hardware = event_loop.hardware().unwrap();
    assert_eq!(hardware.network.handle_calls(), 2);
    assert_eq!(event_loop.ticks(), 2);
}

#[test]
fn failed_audio_is_not_serviced() {
    let log = call_log();
    let failures = Failures {
        audio: true,
        ..Failures::default()
    };
    let state = booted_state(&log, &[], failures);
    let mut event_loop = EventLoop::new(&state);

    block_on(event_loop.tick());

    assert!(position(&log, "audio.process").is_none());
    assert!(position(&log, "battery.update").is_some());
}

#[test]
fn input_is_dispatched_to_the_ui() {
    let log = call_log();
    let state = booted_state(&log, &[InputEvent::Primary], Failures::default());
    let mut event_loop = EventLoop::new(&state);

    assert_eq!(
        block_on(event_loop.tick()),
        TickOutcome::Serviced { events: 1 }
    );
    state.with_ui(|ui, _| {
        assert_eq!(ui.foreground(), Foreground::Screen(ScreenId::Launcher));
    });
}

#[test]
fn app_selected_from_the_launcher_runs_on_the_next_tick() {
    let rect = LauncherScreen::<RecordingToolkit>::button_rect(
        DeviceConfig::default().display,
        AppKind::SmartResponse,
    );
    let input: &'static [InputEvent] = Box::leak(Box::new([
        InputEvent::Primary,
        InputEvent::Tap {
            x: rect.x + 10,
            y: rect.y + 10,
        },
    ]));
    let log = call_log();
    let state = booted_state(&log, input, Failures::default());
    let mut event_loop = EventLoop::new(&state);

    assert_eq!(
        block_on(event_loop.tick()),
        TickOutcome::Serviced { events: 2 }
    );
    state.with_ui(|ui, _| {
        assert_eq!(ui.foreground(), Foreground::App(AppKind::SmartResponse));
        assert_eq!(ui.apps().show_count(AppKind::SmartResponse), 1);
    });

    state.clock().advance_ms(1_000);
    block_on(event_loop.tick());
    state.with_ui(|ui, _| {
        assert!(ui.apps().is_running(AppKind::SmartResponse));
        assert!(ui.apps().get(AppKind::SmartResponse).update_count() >= 2);
        assert_eq!(ui.apps().show_count(AppKind::SmartResponse), 1);
    });
}
