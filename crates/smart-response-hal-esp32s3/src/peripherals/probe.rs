use embedded_hal::i2c::I2c;
use log::{info, warn};
use smart_response_core::peripherals::Peripheral;

use super::PeripheralError;

/// Identity register a chip answers with a fixed value.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ProbeTarget {
    pub name: &'static str,
    pub address: u8,
    pub id_register: u8,
    pub expected_id: u8,
}

/// QMI8658 IMU, `WHO_AM_I`.
pub const QMI8658_PROBE: ProbeTarget = ProbeTarget {
    name: "motion",
    address: 0x6B,
    id_register: 0x00,
    expected_id: 0x05,
};

/// ES8311 codec, chip id 1.
pub const ES8311_PROBE: ProbeTarget = ProbeTarget {
    name: "audio",
    address: 0x18,
    id_register: 0xFD,
    expected_id: 0x83,
};

/// Peripheral whose bring-up is an identity check on the bus.
#[derive(Debug)]
pub struct ChipProbe<I2C> {
    i2c: I2C,
    target: ProbeTarget,
    present: bool,
}

impl<I2C: I2c> ChipProbe<I2C> {
    pub fn new(i2c: I2C, target: ProbeTarget) -> Self {
        Self {
            i2c,
            target,
            present: false,
        }
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn read_register(&mut self, register: u8) -> Result<u8, PeripheralError<I2C::Error>> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.target.address, &[register], &mut value)
            .map_err(PeripheralError::Bus)?;
        Ok(value[0])
    }

    fn probe(&mut self) -> Result<(), PeripheralError<I2C::Error>> {
        let found = self.read_register(self.target.id_register)?;
        if found != self.target.expected_id {
            return Err(PeripheralError::UnexpectedChipId {
                expected: self.target.expected_id,
                found,
            });
        }
        Ok(())
    }
}

impl<I2C: I2c> Peripheral for ChipProbe<I2C> {
    fn name(&self) -> &'static str {
        self.target.name
    }

    fn init(&mut self) -> bool {
        match self.probe() {
            Ok(()) => {
                info!(
                    "{}: chip found addr=0x{:02x}",
                    self.target.name, self.target.address
                );
                self.present = true;
            }
            Err(err) => {
                warn!("{}: probe failed: {:?}", self.target.name, err);
                self.present = false;
            }
        }
        self.present
    }
}
