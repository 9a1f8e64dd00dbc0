use embedded_hal::i2c::I2c;
use log::warn;
use smart_response_core::peripherals::{DateTime, Peripheral, RealTimeClock};

use super::{PeripheralError, bcd_to_bin};

pub const PCF85063_ADDR: u8 = 0x51;

const REG_CONTROL_1: u8 = 0x00;
const REG_SECONDS: u8 = 0x04;

const OSCILLATOR_STOPPED: u8 = 0x80;

/// PCF85063 RTC, 24-hour mode.
#[derive(Debug)]
pub struct Pcf85063Rtc<I2C> {
    i2c: I2C,
    ready: bool,
}

impl<I2C: I2c> Pcf85063Rtc<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c, ready: false }
    }

    fn read_time(&mut self) -> Result<Option<DateTime>, PeripheralError<I2C::Error>> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(PCF85063_ADDR, &[REG_SECONDS], &mut regs)
            .map_err(PeripheralError::Bus)?;

        // Clock integrity is not guaranteed after an oscillator stop.
        if regs[0] & OSCILLATOR_STOPPED != 0 {
            return Ok(None);
        }

        Ok(Some(DateTime {
            second: bcd_to_bin(regs[0] & 0x7F),
            minute: bcd_to_bin(regs[1] & 0x7F),
            hour: bcd_to_bin(regs[2] & 0x3F),
            day: bcd_to_bin(regs[3] & 0x3F),
            // regs[4] is the weekday
            month: bcd_to_bin(regs[5] & 0x1F),
            year: 2000 + bcd_to_bin(regs[6]) as u16,
        }))
    }
}

impl<I2C: I2c> Peripheral for Pcf85063Rtc<I2C> {
    fn name(&self) -> &'static str {
        "rtc"
    }

    fn init(&mut self) -> bool {
        let mut control = [0u8; 1];
        self.ready = match self
            .i2c
            .write_read(PCF85063_ADDR, &[REG_CONTROL_1], &mut control)
        {
            Ok(()) => true,
            Err(err) => {
                warn!("rtc: not responding: {:?}", PeripheralError::Bus(err));
                false
            }
        };
        self.ready
    }
}

impl<I2C: I2c> RealTimeClock for Pcf85063Rtc<I2C> {
    fn now(&mut self) -> Option<DateTime> {
        if !self.ready {
            return None;
        }
        match self.read_time() {
            Ok(time) => time,
            Err(err) => {
                warn!("rtc: read failed: {:?}", err);
                None
            }
        }
    }
}
