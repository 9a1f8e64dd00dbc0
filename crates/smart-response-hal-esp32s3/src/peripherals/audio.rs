use embedded_hal::i2c::I2c;
use smart_response_core::peripherals::{AudioDevice, Peripheral};

use super::{ChipProbe, ES8311_PROBE};

/// Codec handle: bring-up is an identity probe, servicing counts ticks until
/// an audio pipeline is attached.
#[derive(Debug)]
pub struct ProbedAudio<I2C> {
    codec: ChipProbe<I2C>,
    processed: u32,
}

impl<I2C: I2c> ProbedAudio<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            codec: ChipProbe::new(i2c, ES8311_PROBE),
            processed: 0,
        }
    }

    pub fn processed(&self) -> u32 {
        self.processed
    }
}

impl<I2C: I2c> Peripheral for ProbedAudio<I2C> {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn init(&mut self) -> bool {
        self.codec.init()
    }
}

impl<I2C: I2c> AudioDevice for ProbedAudio<I2C> {
    fn process(&mut self) {
        if self.codec.is_present() {
            self.processed = self.processed.wrapping_add(1);
        }
    }
}
