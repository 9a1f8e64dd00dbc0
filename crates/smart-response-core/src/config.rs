//! Compile-time tunables for boot, the event loop, and the screens.

use crate::network::NetworkConfig;

/// Delays inserted between boot stages so rails and the panel settle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BootTiming {
    pub power_settle_ms: u64,
    pub display_settle_ms: u64,
    /// How long "Ready!" stays on the loading screen before standby.
    pub ready_hold_ms: u64,
}

impl Default for BootTiming {
    fn default() -> Self {
        Self {
            power_settle_ms: 100,
            display_settle_ms: 200,
            ready_hold_ms: 500,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LoopTiming {
    /// Sleep between readiness checks while boot is still running.
    pub ready_poll_ms: u64,
    /// Sleep at the end of every serviced tick.
    pub tick_ms: u64,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            ready_poll_ms: 100,
            tick_ms: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DisplayGeometry {
    pub width: u16,
    pub height: u16,
}

impl DisplayGeometry {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub const fn center(self) -> (i16, i16) {
        ((self.width / 2) as i16, (self.height / 2) as i16)
    }
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self::new(410, 502)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceConfig {
    pub boot: BootTiming,
    pub event_loop: LoopTiming,
    pub display: DisplayGeometry,
    pub display_lock_timeout_ms: u64,
    pub standby_refresh_ms: u64,
    pub loading_frame_ms: u64,
    pub network: NetworkConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            boot: BootTiming::default(),
            event_loop: LoopTiming::default(),
            display: DisplayGeometry::default(),
            display_lock_timeout_ms: 50,
            standby_refresh_ms: 1_000,
            loading_frame_ms: 16,
            network: NetworkConfig::default(),
        }
    }
}

impl DeviceConfig {
    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub fn with_display(mut self, display: DisplayGeometry) -> Self {
        self.display = display;
        self
    }

    pub fn with_boot_timing(mut self, boot: BootTiming) -> Self {
        self.boot = boot;
        self
    }
}
