use embedded_hal::{delay::DelayNs, spi::SpiDevice};
use embedded_sdmmc::SdCard;
use log::{info, warn};
use smart_response_core::peripherals::Peripheral;

/// SD card on its own SPI device. Bring-up only checks that a card answers.
pub struct SdCardStorage<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    card: SdCard<SPI, DELAY>,
    card_size_bytes: Option<u64>,
}

impl<SPI, DELAY> SdCardStorage<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    pub fn new(spi: SPI, delay: DELAY) -> Self {
        Self {
            card: SdCard::new(spi, delay),
            card_size_bytes: None,
        }
    }

    pub fn card_size_bytes(&self) -> Option<u64> {
        self.card_size_bytes
    }
}

impl<SPI, DELAY> Peripheral for SdCardStorage<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    fn name(&self) -> &'static str {
        "storage"
    }

    fn init(&mut self) -> bool {
        match self.card.num_bytes() {
            Ok(bytes) => {
                info!("storage: sd card size_bytes={}", bytes);
                self.card_size_bytes = Some(bytes);
                true
            }
            Err(err) => {
                warn!("storage: sd card probe failed: {:?}", err);
                self.card_size_bytes = None;
                false
            }
        }
    }
}
