use embedded_hal::i2c::I2c;

use smart_response_core::input::{InputEvent, InputProvider};

pub const FT3168_ADDR: u8 = 0x38;

const REG_TOUCH_POINTS: u8 = 0x02;

/// FT3168 capacitive touch controller; reports a tap on touch-down.
#[derive(Debug)]
pub struct TouchInput<I2C> {
    i2c: I2C,
    width: u16,
    height: u16,
    touching: bool,
}

impl<I2C: I2c> TouchInput<I2C> {
    pub fn new(i2c: I2C, width: u16, height: u16) -> Self {
        Self {
            i2c,
            width,
            height,
            touching: false,
        }
    }

    /// One register read; used at bring-up to decide whether to poll at all.
    pub fn is_responding(&mut self) -> bool {
        self.read_point().is_ok()
    }

    fn read_point(&mut self) -> Result<Option<(u16, u16)>, I2C::Error> {
        // points, XH, XL, YH, YL
        let mut regs = [0u8; 5];
        self.i2c
            .write_read(FT3168_ADDR, &[REG_TOUCH_POINTS], &mut regs)?;

        if regs[0] & 0x0F == 0 {
            return Ok(None);
        }
        let x = (((regs[1] & 0x0F) as u16) << 8) | regs[2] as u16;
        let y = (((regs[3] & 0x0F) as u16) << 8) | regs[4] as u16;
        Ok(Some((
            x.min(self.width.saturating_sub(1)),
            y.min(self.height.saturating_sub(1)),
        )))
    }
}

impl<I2C: I2c> InputProvider for TouchInput<I2C> {
    type Error = I2C::Error;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        let point = self.read_point()?;
        let was_touching = self.touching;
        self.touching = point.is_some();

        match point {
            Some((x, y)) if !was_touching => Ok(Some(InputEvent::Tap {
                x: x as i16,
                y: y as i16,
            })),
            _ => Ok(None),
        }
    }
}
