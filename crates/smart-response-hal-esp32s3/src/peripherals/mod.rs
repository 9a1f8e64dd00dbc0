//! I²C and SPI peripheral handles brought up by boot.
//!
//! Every handle owns its bus device. The I²C parts share one bus through
//! `embedded_hal_bus::i2c::RefCellDevice`, which is enough because boot and
//! the event loop never poll peripherals concurrently.

mod audio;
mod axp2101;
mod pcf85063;
mod probe;

pub use audio::ProbedAudio;
pub use axp2101::{AXP2101_ADDR, Axp2101Battery};
pub use pcf85063::{PCF85063_ADDR, Pcf85063Rtc};
pub use probe::{ChipProbe, ES8311_PROBE, ProbeTarget, QMI8658_PROBE};

pub use crate::storage::SdCardStorage;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PeripheralError<BusErr> {
    Bus(BusErr),
    UnexpectedChipId { expected: u8, found: u8 },
    NotInitialized,
}

pub(crate) fn bcd_to_bin(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}
