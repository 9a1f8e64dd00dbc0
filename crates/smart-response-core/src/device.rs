//! Shared device state: the display, the UI, and the readiness hand-off
//! between the boot orchestrator and the event loop.

use core::{
    cell::RefCell,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{
    config::DeviceConfig,
    display::DisplayGatekeeper,
    input::InputProvider,
    network::NetworkLink,
    peripherals::{AudioDevice, BatteryGauge, Peripheral, PeripheralHealth, RealTimeClock},
    render::Toolkit,
    screen::ScreenContext,
    settings::ConfigStore,
    time::Clock,
    ui::{DeviceStatus, Ui},
};

/// Concrete collaborator types for one board.
pub trait Board {
    type Toolkit: Toolkit;
    type Clock: Clock;
    type Battery: BatteryGauge;
    type Rtc: RealTimeClock;
    type Motion: Peripheral;
    type Storage: Peripheral;
    type Audio: AudioDevice;
    type Config: ConfigStore;
    type Network: NetworkLink;
    type Input: InputProvider;
}

/// Peripherals owned by boot until readiness, then by the event loop.
pub struct Hardware<B: Board> {
    pub battery: B::Battery,
    pub rtc: B::Rtc,
    pub motion: B::Motion,
    pub storage: B::Storage,
    pub audio: B::Audio,
    pub config: B::Config,
    pub network: B::Network,
    pub input: B::Input,
    pub health: PeripheralHealth,
}

impl<B: Board> Hardware<B> {
    /// Current readings for the screens. Failed peripherals read as empty.
    pub fn status(&mut self) -> DeviceStatus {
        DeviceStatus {
            time: if self.health.rtc { self.rtc.now() } else { None },
            battery: self.battery.reading(),
            wifi: self.network.status(),
        }
    }
}

/// Write-once "boot finished" flag.
#[derive(Debug, Default)]
pub struct ReadinessFlag(AtomicBool);

impl ReadinessFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Returns `false` if the flag was already set.
    pub fn set(&self) -> bool {
        !self.0.swap(true, Ordering::Release)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct DeviceState<B: Board> {
    ready: ReadinessFlag,
    config: DeviceConfig,
    clock: B::Clock,
    display: DisplayGatekeeper<B::Toolkit>,
    ui: RefCell<Ui<B::Toolkit>>,
    handoff: RefCell<Option<Hardware<B>>>,
}

impl<B: Board> DeviceState<B> {
    /// `toolkit` is `None` when the display failed to come up.
    pub fn new(config: DeviceConfig, clock: B::Clock, toolkit: Option<B::Toolkit>) -> Self {
        Self {
            ready: ReadinessFlag::new(),
            config,
            clock,
            display: DisplayGatekeeper::new(toolkit),
            ui: RefCell::new(Ui::new()),
            handoff: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn clock(&self) -> &B::Clock {
        &self.clock
    }

    pub fn display(&self) -> &DisplayGatekeeper<B::Toolkit> {
        &self.display
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_set()
    }

    pub fn screen_context(&self) -> ScreenContext<'_, B::Toolkit, B::Clock> {
        ScreenContext::new(&self.display, &self.clock, &self.config)
    }

    /// Borrows the UI for one synchronous step. Never hold it across an await.
    pub fn with_ui<R>(
        &self,
        f: impl FnOnce(&mut Ui<B::Toolkit>, &ScreenContext<'_, B::Toolkit, B::Clock>) -> R,
    ) -> R {
        let ctx = self.screen_context();
        let mut ui = self.ui.borrow_mut();
        f(&mut ui, &ctx)
    }

    /// Parks the hardware for the event loop and flips readiness.
    pub(crate) fn publish_ready(&self, hardware: Hardware<B>) -> bool {
        *self.handoff.borrow_mut() = Some(hardware);
        self.ready.set()
    }

    pub(crate) fn take_hardware(&self) -> Option<Hardware<B>> {
        self.handoff.borrow_mut().take()
    }
}
