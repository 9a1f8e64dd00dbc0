use embedded_graphics::{
    pixelcolor::{Rgb565, raw::RawU16},
    prelude::*,
    primitives::Rectangle,
};
use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

pub const PANEL_WIDTH: u16 = 410;
pub const PANEL_HEIGHT: u16 = 502;
const COLUMN_OFFSET: u16 = 22;

// Single-line register write framing: [0x02, 0x00, cmd, 0x00, params...]
const WRITE_REG: u8 = 0x02;

const CMD_SLPOUT: u8 = 0x11;
const CMD_DISPON: u8 = 0x29;
const CMD_CASET: u8 = 0x2A;
const CMD_RASET: u8 = 0x2B;
const CMD_RAMWR: u8 = 0x2C;
const CMD_MADCTL: u8 = 0x36;
const CMD_COLMOD: u8 = 0x3A;
const CMD_BRIGHTNESS: u8 = 0x51;

const COLMOD_RGB565: u8 = 0x55;
const PIXEL_CHUNK: usize = 64;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PanelError<SpiErr, CsErr, RstErr> {
    Spi(SpiErr),
    Cs(CsErr),
    Rst(RstErr),
}

pub type PanelResult<SpiErr, CsErr, RstErr, T = ()> =
    Result<T, PanelError<SpiErr, CsErr, RstErr>>;

/// 410×502 AMOLED driven with MIPI DCS commands over plain SPI.
#[derive(Debug)]
pub struct AmoledPanel<SPI, CS, RST> {
    spi: SPI,
    cs: CS,
    rst: RST,
}

impl<SPI, CS, RST> AmoledPanel<SPI, CS, RST>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    RST: OutputPin,
{
    pub fn new(spi: SPI, cs: CS, rst: RST) -> Self {
        Self { spi, cs, rst }
    }

    /// Hardware reset, wake, RGB565, full brightness, display on.
    pub fn initialize<D>(&mut self, delay: &mut D) -> PanelResult<SPI::Error, CS::Error, RST::Error>
    where
        D: DelayNs,
    {
        self.cs.set_high().map_err(PanelError::Cs)?;
        self.rst.set_low().map_err(PanelError::Rst)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(PanelError::Rst)?;
        delay.delay_ms(120);

        self.command(CMD_SLPOUT, &[])?;
        delay.delay_ms(120);
        self.command(CMD_COLMOD, &[COLMOD_RGB565])?;
        self.command(CMD_MADCTL, &[0x00])?;
        self.command(CMD_BRIGHTNESS, &[0xFF])?;
        self.command(CMD_DISPON, &[])?;
        delay.delay_ms(20);
        Ok(())
    }

    pub fn set_brightness(&mut self, level: u8) -> PanelResult<SPI::Error, CS::Error, RST::Error> {
        self.command(CMD_BRIGHTNESS, &[level])
    }

    fn command(&mut self, cmd: u8, params: &[u8]) -> PanelResult<SPI::Error, CS::Error, RST::Error> {
        self.cs.set_low().map_err(PanelError::Cs)?;
        let result = self.write_framed(cmd, params);
        self.cs.set_high().map_err(PanelError::Cs)?;
        result
    }

    fn write_framed(&mut self, cmd: u8, params: &[u8]) -> PanelResult<SPI::Error, CS::Error, RST::Error> {
        self.spi
            .write(&[WRITE_REG, 0x00, cmd, 0x00])
            .map_err(PanelError::Spi)?;
        if !params.is_empty() {
            self.spi.write(params).map_err(PanelError::Spi)?;
        }
        self.spi.flush().map_err(PanelError::Spi)
    }

    fn set_window(&mut self, area: &Rectangle) -> PanelResult<SPI::Error, CS::Error, RST::Error> {
        let x0 = area.top_left.x as u16 + COLUMN_OFFSET;
        let y0 = area.top_left.y as u16;
        let x1 = x0 + area.size.width as u16 - 1;
        let y1 = y0 + area.size.height as u16 - 1;

        let [x0h, x0l] = x0.to_be_bytes();
        let [x1h, x1l] = x1.to_be_bytes();
        let [y0h, y0l] = y0.to_be_bytes();
        let [y1h, y1l] = y1.to_be_bytes();
        self.command(CMD_CASET, &[x0h, x0l, x1h, x1l])?;
        self.command(CMD_RASET, &[y0h, y0l, y1h, y1l])
    }

    /// Streams exactly the pixels of the current window.
    fn write_pixels<I>(&mut self, colors: I) -> PanelResult<SPI::Error, CS::Error, RST::Error>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        self.cs.set_low().map_err(PanelError::Cs)?;
        let result = self.stream_pixels(colors);
        self.cs.set_high().map_err(PanelError::Cs)?;
        result
    }

    fn stream_pixels<I>(&mut self, colors: I) -> PanelResult<SPI::Error, CS::Error, RST::Error>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        self.spi
            .write(&[WRITE_REG, 0x00, CMD_RAMWR, 0x00])
            .map_err(PanelError::Spi)?;

        let mut chunk = [0u8; PIXEL_CHUNK * 2];
        let mut filled = 0usize;
        for color in colors {
            let raw = RawU16::from(color).into_inner().to_be_bytes();
            chunk[filled..filled + 2].copy_from_slice(&raw);
            filled += 2;
            if filled == chunk.len() {
                self.spi.write(&chunk).map_err(PanelError::Spi)?;
                filled = 0;
            }
        }
        if filled > 0 {
            self.spi.write(&chunk[..filled]).map_err(PanelError::Spi)?;
        }
        self.spi.flush().map_err(PanelError::Spi)
    }
}

impl<SPI, CS, RST> OriginDimensions for AmoledPanel<SPI, CS, RST> {
    fn size(&self) -> Size {
        Size::new(PANEL_WIDTH as u32, PANEL_HEIGHT as u32)
    }
}

impl<SPI, CS, RST> DrawTarget for AmoledPanel<SPI, CS, RST>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = PanelError<SPI::Error, CS::Error, RST::Error>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if !bounds.contains(point) {
                continue;
            }
            self.set_window(&Rectangle::new(point, Size::new(1, 1)))?;
            self.write_pixels([color])?;
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let clipped = area.intersection(&self.bounding_box());
        if clipped.is_zero_sized() {
            return Ok(());
        }

        if clipped == *area {
            self.set_window(area)?;
            return self.write_pixels(colors);
        }

        self.set_window(&clipped)?;
        let visible = area
            .points()
            .zip(colors)
            .filter(|(point, _)| clipped.contains(*point))
            .map(|(_, color)| color);
        self.write_pixels(visible)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        if clipped.is_zero_sized() {
            return Ok(());
        }
        self.set_window(&clipped)?;
        let count = clipped.size.width as usize * clipped.size.height as usize;
        self.write_pixels(core::iter::repeat_n(color, count))
    }
}
