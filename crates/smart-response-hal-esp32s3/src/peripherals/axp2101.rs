use embedded_hal::i2c::I2c;
use log::{debug, info, warn};
use smart_response_core::peripherals::{BatteryGauge, BatteryReading, Peripheral};

use super::PeripheralError;

pub const AXP2101_ADDR: u8 = 0x34;

const REG_STATUS_2: u8 = 0x01;
const REG_CHIP_ID: u8 = 0x03;
const REG_GAUGE_CTRL: u8 = 0x18;
const REG_BATTERY_PERCENT: u8 = 0xA4;

const CHIP_ID: u8 = 0x4A;
const GAUGE_ENABLE: u8 = 1 << 3;
const CHARGE_DIRECTION_SHIFT: u8 = 5;
const CHARGE_DIRECTION_CHARGING: u8 = 0b01;

/// AXP2101 PMIC fuel gauge.
#[derive(Debug)]
pub struct Axp2101Battery<I2C> {
    i2c: I2C,
    poll_interval_ms: u64,
    next_poll_ms: u64,
    ready: bool,
    reading: Option<BatteryReading>,
}

impl<I2C: I2c> Axp2101Battery<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            poll_interval_ms: 1_000,
            next_poll_ms: 0,
            ready: false,
            reading: None,
        }
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    fn read_register(&mut self, register: u8) -> Result<u8, PeripheralError<I2C::Error>> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(AXP2101_ADDR, &[register], &mut value)
            .map_err(PeripheralError::Bus)?;
        Ok(value[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), PeripheralError<I2C::Error>> {
        self.i2c
            .write(AXP2101_ADDR, &[register, value])
            .map_err(PeripheralError::Bus)
    }

    fn bring_up(&mut self) -> Result<(), PeripheralError<I2C::Error>> {
        let found = self.read_register(REG_CHIP_ID)?;
        if found != CHIP_ID {
            return Err(PeripheralError::UnexpectedChipId {
                expected: CHIP_ID,
                found,
            });
        }

        let gauge = self.read_register(REG_GAUGE_CTRL)?;
        if gauge & GAUGE_ENABLE == 0 {
            self.write_register(REG_GAUGE_CTRL, gauge | GAUGE_ENABLE)?;
        }
        Ok(())
    }

    fn sample(&mut self) -> Result<BatteryReading, PeripheralError<I2C::Error>> {
        if !self.ready {
            return Err(PeripheralError::NotInitialized);
        }
        let percent = self.read_register(REG_BATTERY_PERCENT)?;
        let status = self.read_register(REG_STATUS_2)?;
        let charging = (status >> CHARGE_DIRECTION_SHIFT) & 0b11 == CHARGE_DIRECTION_CHARGING;
        Ok(BatteryReading::new(percent, charging))
    }
}

impl<I2C: I2c> Peripheral for Axp2101Battery<I2C> {
    fn name(&self) -> &'static str {
        "battery"
    }

    fn init(&mut self) -> bool {
        self.ready = match self.bring_up() {
            Ok(()) => true,
            Err(err) => {
                warn!("battery: pmic bring-up failed: {:?}", err);
                false
            }
        };
        if self.ready {
            self.reading = self.sample().ok();
            if let Some(reading) = self.reading {
                info!(
                    "battery: level={}% charging={}",
                    reading.level_percent, reading.charging
                );
            }
        }
        self.ready
    }
}

impl<I2C: I2c> BatteryGauge for Axp2101Battery<I2C> {
    fn update(&mut self, now_ms: u64) {
        if !self.ready || now_ms < self.next_poll_ms {
            return;
        }
        self.next_poll_ms = now_ms.saturating_add(self.poll_interval_ms);

        match self.sample() {
            Ok(reading) => self.reading = Some(reading),
            Err(err) => debug!("battery: sample failed: {:?}", err),
        }
    }

    fn reading(&self) -> Option<BatteryReading> {
        self.reading
    }
}
