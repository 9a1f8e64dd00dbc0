//! One-shot boot sequence: peripherals, loading screen, network bring-up,
//! standby, readiness.

use heapless::Vec;
use log::{error, info, warn};

use crate::{
    device::{Board, DeviceState, Hardware},
    input::ButtonBindings,
    network::{BringUpOutcome, NetworkBringUp, NetworkLink},
    peripherals::{PeripheralHealth, init_logged},
    screen::{ScreenId, clamp_percent},
    settings::ConfigStore,
    time::Clock,
    ui::DeviceStatus,
};

const PROGRESS_TRACE_CAPACITY: usize = 16;
const PARK_INTERVAL_MS: u64 = 1_000;

/// Keeps reported progress clamped and non-decreasing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProgressTracker {
    last: u8,
    trace: Vec<u8, PROGRESS_TRACE_CAPACITY>,
}

impl ProgressTracker {
    pub const fn new() -> Self {
        Self {
            last: 0,
            trace: Vec::new(),
        }
    }

    pub fn advance(&mut self, requested: i16) -> u8 {
        let clamped = clamp_percent(requested);
        if clamped < self.last {
            warn!("boot: progress {} below {}; holding", clamped, self.last);
        }
        self.last = self.last.max(clamped);
        let _ = self.trace.push(self.last);
        self.last
    }

    pub const fn last(&self) -> u8 {
        self.last
    }

    pub fn trace(&self) -> &[u8] {
        &self.trace
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BootReport {
    pub health: PeripheralHealth,
    pub config_loaded: bool,
    pub network: BringUpOutcome,
    pub progress: ProgressTracker,
    pub standby_shown: bool,
}

pub struct BootOrchestrator<'a, B: Board> {
    state: &'a DeviceState<B>,
    progress: ProgressTracker,
}

impl<'a, B: Board> BootOrchestrator<'a, B> {
    pub const fn new(state: &'a DeviceState<B>) -> Self {
        Self {
            state,
            progress: ProgressTracker::new(),
        }
    }

    /// Runs the boot sequence once and hands `hardware` to the event loop.
    pub async fn run(mut self, mut hardware: Hardware<B>) -> BootReport {
        let state = self.state;
        let clock = state.clock();
        let timing = state.config().boot;
        info!("boot: starting");

        hardware.health.battery = init_logged(&mut hardware.battery);
        hardware.health.display = state.display().is_ready();
        if !hardware.health.display {
            error!("boot: display unavailable; continuing without screens");
        }
        clock.sleep_ms(timing.power_settle_ms).await;

        clock.sleep_ms(timing.display_settle_ms).await;
        state.with_ui(|ui, ctx| {
            ui.screens_mut()
                .show(ScreenId::Loading, ctx, &DeviceStatus::default())
        });
        self.report(10, Some("Initializing hardware"));
        clock.sleep_ms(timing.power_settle_ms).await;

        state.with_ui(|ui, _| ui.register_buttons(ButtonBindings::default()));
        self.report(20, None);

        self.report(30, Some("Initializing clock"));
        hardware.health.rtc = init_logged(&mut hardware.rtc);
        self.report(40, None);

        hardware.health.motion = init_logged(&mut hardware.motion);
        self.report(50, None);

        self.report(55, Some("Initializing SD card"));
        hardware.health.storage = init_logged(&mut hardware.storage);

        self.report(60, Some("Initializing audio"));
        hardware.health.audio = init_logged(&mut hardware.audio);

        self.report(70, Some("Loading config"));
        let config_loaded = match hardware.config.load() {
            Ok(()) => true,
            Err(err) => {
                warn!("boot: config load failed: {:?}; using defaults", err);
                false
            }
        };

        self.report(80, Some("Initializing Wi-Fi"));
        hardware.health.network = hardware.network.init();
        if !hardware.health.network {
            warn!("boot: wifi driver init failed; network stays offline");
        }

        self.message("Connecting...");
        let network = NetworkBringUp::new(&state.config().network)
            .run(&mut hardware.network, &mut hardware.config, clock)
            .await;
        info!(
            "boot: network bring-up finished state={}",
            network.state.label()
        );
        self.report(90, None);

        state.with_ui(|ui, _| ui.enable_launching());
        self.report(100, Some("Ready!"));
        clock.sleep_ms(timing.ready_hold_ms).await;

        let status = hardware.status();
        let standby_shown =
            state.with_ui(|ui, ctx| ui.screens_mut().show(ScreenId::Standby, ctx, &status));

        let health = hardware.health;
        info!(
            "boot: health battery={} display={} rtc={} motion={} storage={} audio={} network={}",
            health.battery,
            health.display,
            health.rtc,
            health.motion,
            health.storage,
            health.audio,
            health.network
        );

        if !state.publish_ready(hardware) {
            warn!("boot: readiness was already set");
        }
        info!("boot: complete");

        BootReport {
            health,
            config_loaded,
            network,
            progress: self.progress,
            standby_shown,
        }
    }

    /// Boots, then idles forever.
    pub async fn run_forever(self, hardware: Hardware<B>) -> ! {
        let state = self.state;
        let _ = self.run(hardware).await;
        park(state.clock()).await
    }

    fn report(&mut self, percent: i16, message: Option<&str>) {
        let shown = self.progress.advance(percent);
        self.state.with_ui(|ui, ctx| {
            let loading = ui.screens_mut().loading_mut();
            if let Some(message) = message {
                loading.set_message(ctx, message);
            }
            loading.set_progress(ctx, shown as i16);
        });
    }

    fn message(&mut self, text: &str) {
        self.state
            .with_ui(|ui, ctx| ui.screens_mut().loading_mut().set_message(ctx, text));
    }
}

/// Inert wait loop for a unit that has finished its work.
pub async fn park<C: Clock>(clock: &C) -> ! {
    loop {
        clock.sleep_ms(PARK_INTERVAL_MS).await;
    }
}
