mod flash_config;
mod sd_card;

pub use flash_config::{FlashConfigError, FlashConfigStore};
pub use sd_card::SdCardStorage;
