//! Peripheral handles brought up during boot and serviced by the event loop.
//!
//! Every handle reports `init() -> bool`; a failed handle stays in the system
//! and its readings come back empty, so callers degrade instead of stopping.

use core::fmt::Write;

use heapless::String;

pub trait Peripheral {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Bounded bring-up. `false` means degraded, never fatal.
    fn init(&mut self) -> bool;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BatteryReading {
    pub level_percent: u8,
    pub charging: bool,
}

impl BatteryReading {
    pub const fn new(level_percent: u8, charging: bool) -> Self {
        Self {
            level_percent: if level_percent > 100 {
                100
            } else {
                level_percent
            },
            charging,
        }
    }
}

pub trait BatteryGauge: Peripheral {
    /// Steady-state polling, once per event loop tick.
    fn update(&mut self, now_ms: u64);
    fn reading(&self) -> Option<BatteryReading>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// `HH:MM:SS`
    pub fn time_string(&self) -> String<8> {
        let mut out = String::new();
        let _ = write!(out, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second);
        out
    }

    /// `YYYY-MM-DD`
    pub fn date_string(&self) -> String<10> {
        let mut out = String::new();
        let _ = write!(out, "{:04}-{:02}-{:02}", self.year, self.month, self.day);
        out
    }
}

pub trait RealTimeClock: Peripheral {
    fn now(&mut self) -> Option<DateTime>;
}

pub trait AudioDevice: Peripheral {
    /// Moves buffered audio along; called once per event loop tick.
    fn process(&mut self);
}

/// Which peripherals came up during boot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PeripheralHealth {
    pub battery: bool,
    pub display: bool,
    pub rtc: bool,
    pub motion: bool,
    pub storage: bool,
    pub audio: bool,
    pub network: bool,
}

impl PeripheralHealth {
    pub const fn all_up(&self) -> bool {
        self.battery
            && self.display
            && self.rtc
            && self.motion
            && self.storage
            && self.audio
            && self.network
    }
}

/// Runs `init` on a handle and logs the result.
pub fn init_logged<P: Peripheral + ?Sized>(peripheral: &mut P) -> bool {
    let ok = peripheral.init();
    if ok {
        log::info!("boot: {} ready", peripheral.name());
    } else {
        log::warn!("boot: {} init failed; continuing without it", peripheral.name());
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_time_formats_with_padding() {
        let dt = DateTime {
            year: 2026,
            month: 3,
            day: 7,
            hour: 9,
            minute: 5,
            second: 0,
        };
        assert_eq!(dt.time_string().as_str(), "09:05:00");
        assert_eq!(dt.date_string().as_str(), "2026-03-07");
    }

    #[test]
    fn battery_level_is_capped() {
        assert_eq!(BatteryReading::new(140, false).level_percent, 100);
    }
}
