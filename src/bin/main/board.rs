use embedded_hal_bus::{i2c::RefCellDevice, spi::ExclusiveDevice};
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{Input, Output},
    i2c::master::I2c,
    spi::master::Spi,
};
use smart_response_core::{
    device::Board,
    network::{NetworkCredentials, NetworkLink, OfflineLink, WifiStatus},
    settings::{ConfigKey, ConfigStore, MemoryConfigStore, MemoryStoreError},
};
use smart_response_hal_esp32s3::{
    input::{BoardInput, ButtonInput, TouchInput},
    network::EspWifiLink,
    peripherals::{Axp2101Battery, ChipProbe, Pcf85063Rtc, ProbedAudio, SdCardStorage},
    platform::display::AmoledPanel,
    render::CanvasToolkit,
    storage::{FlashConfigError, FlashConfigStore},
    time::EmbassyClock,
};

pub type SharedI2c = RefCellDevice<'static, I2c<'static, Blocking>>;
pub type Panel = AmoledPanel<Spi<'static, Blocking>, Output<'static>, Output<'static>>;
pub type PanelToolkit = CanvasToolkit<Panel>;
pub type SdDevice = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, Delay>;
pub type Buttons = ButtonInput<Input<'static>, Input<'static>>;

/// The Waveshare ESP32-S3 AMOLED handheld.
pub struct EspBoard;

impl Board for EspBoard {
    type Toolkit = PanelToolkit;
    type Clock = EmbassyClock;
    type Battery = Axp2101Battery<SharedI2c>;
    type Rtc = Pcf85063Rtc<SharedI2c>;
    type Motion = ChipProbe<SharedI2c>;
    type Storage = SdCardStorage<SdDevice, Delay>;
    type Audio = ProbedAudio<SharedI2c>;
    type Config = BoardConfigStore;
    type Network = BoardNetwork;
    type Input = BoardInput<Buttons, TouchInput<SharedI2c>>;
}

/// Flash-backed when the config partition was found, volatile otherwise.
pub enum BoardConfigStore {
    Flash(FlashConfigStore),
    Memory(MemoryConfigStore),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BoardConfigError {
    Flash(FlashConfigError),
    Memory(MemoryStoreError),
}

impl ConfigStore for BoardConfigStore {
    type Error = BoardConfigError;

    fn load(&mut self) -> Result<(), Self::Error> {
        match self {
            Self::Flash(store) => store.load().map_err(BoardConfigError::Flash),
            Self::Memory(store) => store.load().map_err(BoardConfigError::Memory),
        }
    }

    fn get(&self, key: ConfigKey) -> Option<&str> {
        match self {
            Self::Flash(store) => store.get(key),
            Self::Memory(store) => store.get(key),
        }
    }

    fn save_all(&mut self, entries: &[(ConfigKey, &str)]) -> Result<(), Self::Error> {
        match self {
            Self::Flash(store) => store.save_all(entries).map_err(BoardConfigError::Flash),
            Self::Memory(store) => store.save_all(entries).map_err(BoardConfigError::Memory),
        }
    }
}

/// Wi-Fi when the radio came up, a permanently offline link otherwise.
pub enum BoardNetwork {
    Wifi(EspWifiLink),
    Offline(OfflineLink),
}

impl NetworkLink for BoardNetwork {
    fn init(&mut self) -> bool {
        match self {
            Self::Wifi(link) => link.init(),
            Self::Offline(link) => link.init(),
        }
    }

    async fn connect(&mut self, credentials: &NetworkCredentials) -> bool {
        match self {
            Self::Wifi(link) => link.connect(credentials).await,
            Self::Offline(link) => link.connect(credentials).await,
        }
    }

    async fn start_provisioning_ap(&mut self, ap_ssid: &str) -> bool {
        match self {
            Self::Wifi(link) => link.start_provisioning_ap(ap_ssid).await,
            Self::Offline(link) => link.start_provisioning_ap(ap_ssid).await,
        }
    }

    async fn handle(&mut self, now_ms: u64) {
        match self {
            Self::Wifi(link) => link.handle(now_ms).await,
            Self::Offline(link) => link.handle(now_ms).await,
        }
    }

    fn status(&self) -> WifiStatus {
        match self {
            Self::Wifi(link) => link.status(),
            Self::Offline(link) => link.status(),
        }
    }
}
