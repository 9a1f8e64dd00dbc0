#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use core::cell::RefCell;

use embassy_executor::Spawner;
use embassy_net::{Runner, StackResources};
use embassy_time::Timer;
use embedded_hal_bus::{i2c::RefCellDevice, spi::ExclusiveDevice};
use esp_hal::{
    Blocking,
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::I2c,
    spi::master::Spi,
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_radio::wifi::WifiDevice;
use log::{LevelFilter, error, info, warn};
use smart_response_core::{
    boot::BootOrchestrator,
    config::{DeviceConfig, DisplayGeometry},
    device::{DeviceState, Hardware},
    event_loop::EventLoop,
    network::{NetworkConfig, NetworkCredentials, OfflineLink, serve},
    peripherals::PeripheralHealth,
    settings::MemoryConfigStore,
};
use smart_response_hal_esp32s3::{
    input::{BoardInput, ButtonConfig, ButtonInput, TouchInput},
    network::{ConnectivityHandle, EspWifiLink, WifiControl, WifiLinkConfig, WifiSupervisor},
    peripherals::{
        Axp2101Battery, ChipProbe, Pcf85063Rtc, ProbedAudio, QMI8658_PROBE, SdCardStorage,
    },
    platform::display::{AmoledPanel, PANEL_HEIGHT, PANEL_WIDTH},
    render::CanvasToolkit,
    storage::FlashConfigStore,
    time::EmbassyClock,
};
use static_cell::StaticCell;

use board::{BoardConfigStore, BoardNetwork, EspBoard};

#[path = "main/board.rs"]
mod board;
#[path = "main/refresh.rs"]
mod refresh;

const I2C_HZ: u32 = 400_000;
const DISPLAY_SPI_HZ: u32 = 40_000_000;
const SD_SPI_HZ: u32 = 1_000_000;
const DISPLAY_REFRESH_MS: u64 = 33;
const BUTTON_DEBOUNCE_POLLS: u8 = 3;
const WIFI_ASSOCIATION_TIMEOUT_SECS: u64 = 10;
const DHCP_TIMEOUT_SECS: u64 = 15;
const NETWORK_POLL_INTERVAL_MS: u64 = 500;

const FALLBACK_SSID: &str = env!(
    "SMART_RESPONSE_FALLBACK_SSID",
    "Set SMART_RESPONSE_FALLBACK_SSID in your environment before building/flashing."
);
const FALLBACK_PASSWORD: &str = env!(
    "SMART_RESPONSE_FALLBACK_PASSWORD",
    "Set SMART_RESPONSE_FALLBACK_PASSWORD in your environment before building/flashing."
);

static CONNECTIVITY: ConnectivityHandle = ConnectivityHandle::new();
static WIFI_CONTROL: WifiControl = WifiControl::new();
static NET_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
static I2C_BUS: StaticCell<RefCell<I2c<'static, Blocking>>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: smart response starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut delay = Delay::new();

    // Shared I2C: AXP2101, PCF85063, QMI8658, ES8311, FT3168.
    // SDA=GPIO15, SCL=GPIO14
    let i2c = I2c::new(
        peripherals.I2C0,
        esp_hal::i2c::master::Config::default().with_frequency(Rate::from_hz(I2C_HZ)),
    )
    .unwrap()
    .with_sda(peripherals.GPIO15)
    .with_scl(peripherals.GPIO14);
    let i2c_bus: &'static RefCell<I2c<'static, Blocking>> = I2C_BUS.init(RefCell::new(i2c));

    // AMOLED wiring: CLK=GPIO11, DI=GPIO4, CS=GPIO12, RST=GPIO8
    let panel_spi = Spi::new(
        peripherals.SPI2,
        esp_hal::spi::master::Config::default()
            .with_frequency(Rate::from_hz(DISPLAY_SPI_HZ))
            .with_mode(esp_hal::spi::Mode::_0),
    )
    .unwrap()
    .with_sck(peripherals.GPIO11)
    .with_mosi(peripherals.GPIO4);
    let panel_cs = Output::new(peripherals.GPIO12, Level::High, OutputConfig::default());
    let panel_rst = Output::new(peripherals.GPIO8, Level::High, OutputConfig::default());

    let mut panel = AmoledPanel::new(panel_spi, panel_cs, panel_rst);
    esp_println::println!("display: init begin (CLK=11 DI=4 CS=12 RST=8)");
    let toolkit = match panel.initialize(&mut delay) {
        Ok(()) => {
            esp_println::println!("display: initialize ok");
            Some(CanvasToolkit::new(panel))
        }
        Err(err) => {
            esp_println::println!("display: initialize failed");
            error!("display: initialize failed: {:?}; running headless", err);
            None
        }
    };

    // Buttons: PWR sense=GPIO10, BOOT=GPIO0
    let input_cfg = InputConfig::default().with_pull(Pull::Up);
    let buttons = ButtonInput::new(
        Input::new(peripherals.GPIO10, input_cfg),
        Input::new(peripherals.GPIO0, input_cfg),
        ButtonConfig::default().with_debounce_polls(BUTTON_DEBOUNCE_POLLS),
    )
    .unwrap();
    let mut touch = TouchInput::new(RefCellDevice::new(i2c_bus), PANEL_WIDTH, PANEL_HEIGHT);
    let touch = if touch.is_responding() {
        Some(touch)
    } else {
        warn!("input: touch controller not responding; buttons only");
        None
    };

    // SD wiring: CS=GPIO17, SCK=GPIO2, MOSI=GPIO1, MISO=GPIO3
    let sd_spi = Spi::new(
        peripherals.SPI3,
        esp_hal::spi::master::Config::default()
            .with_frequency(Rate::from_hz(SD_SPI_HZ))
            .with_mode(esp_hal::spi::Mode::_0),
    )
    .unwrap()
    .with_sck(peripherals.GPIO2)
    .with_mosi(peripherals.GPIO1)
    .with_miso(peripherals.GPIO3);
    let sd_cs = Output::new(peripherals.GPIO17, Level::High, OutputConfig::default());
    let Ok(sd_device) = ExclusiveDevice::new(sd_spi, sd_cs, Delay::new());

    let config_store = match FlashConfigStore::new() {
        Ok(store) => BoardConfigStore::Flash(store),
        Err(err) => {
            warn!("config: flash store unavailable: {:?}; settings will not persist", err);
            BoardConfigStore::Memory(MemoryConfigStore::new())
        }
    };

    let wifi_config = WifiLinkConfig::default()
        .with_association_timeout_secs(WIFI_ASSOCIATION_TIMEOUT_SECS)
        .with_dhcp_timeout_secs(DHCP_TIMEOUT_SECS)
        .with_poll_interval_ms(NETWORK_POLL_INTERVAL_MS);
    let (network, radio) = bring_up_radio(peripherals.WIFI, wifi_config);

    let device_config = DeviceConfig::default()
        .with_display(DisplayGeometry::new(PANEL_WIDTH, PANEL_HEIGHT))
        .with_network(
            NetworkConfig::default()
                .with_fallback(NetworkCredentials::new(FALLBACK_SSID, FALLBACK_PASSWORD))
                .with_link_timeouts(
                    wifi_config.association_timeout_ms(),
                    wifi_config.dhcp_timeout_ms(),
                ),
        );
    let lock_timeout_ms = device_config.display_lock_timeout_ms;

    let state: DeviceState<EspBoard> =
        DeviceState::new(device_config, EmbassyClock::new(), toolkit);

    let hardware = Hardware::<EspBoard> {
        battery: Axp2101Battery::new(RefCellDevice::new(i2c_bus)),
        rtc: Pcf85063Rtc::new(RefCellDevice::new(i2c_bus)),
        motion: ChipProbe::new(RefCellDevice::new(i2c_bus), QMI8658_PROBE),
        storage: SdCardStorage::new(sd_device, Delay::new()),
        audio: ProbedAudio::new(RefCellDevice::new(i2c_bus)),
        config: config_store,
        network,
        input: BoardInput::new(buttons, touch),
        health: PeripheralHealth::default(),
    };

    info!("I2C pins: SDA=GPIO15 SCL=GPIO14");
    info!("SD pins: CS=GPIO17 SCK=GPIO2 MOSI=GPIO1 MISO=GPIO3");
    info!("Button pins: PWR=GPIO10 BOOT=GPIO0");

    // Radio work lives here so reconnects never stall the event loop.
    let net_future = async {
        match radio {
            Some((mut runner, mut supervisor)) => {
                let _ = embassy_futures::join::join(
                    runner.run(),
                    serve(&WIFI_CONTROL, &mut supervisor),
                )
                .await;
            }
            None => loop {
                Timer::after_secs(60).await;
            },
        }
    };
    let refresh_future = refresh::display_refresh_loop(
        state.display(),
        state.clock(),
        DISPLAY_REFRESH_MS,
        lock_timeout_ms,
    );
    let boot_future = BootOrchestrator::new(&state).run_forever(hardware);
    let loop_future = EventLoop::new(&state).run();

    let _ = embassy_futures::join::join4(net_future, refresh_future, boot_future, loop_future).await;
    unreachable!()
}

type RadioTasks = (Runner<'static, WifiDevice<'static>>, WifiSupervisor<'static>);

/// Radio, Wi-Fi controller and DHCP stack. Any failure leaves the device
/// offline instead of halting boot.
fn bring_up_radio(
    wifi: esp_hal::peripherals::WIFI<'static>,
    wifi_config: WifiLinkConfig,
) -> (BoardNetwork, Option<RadioTasks>) {
    let radio = match esp_radio::init() {
        Ok(radio) => RADIO.init(radio),
        Err(err) => {
            warn!("wifi: esp-radio init failed: {:?}; staying offline", err);
            return (BoardNetwork::Offline(OfflineLink::new()), None);
        }
    };

    let (controller, interfaces) =
        match esp_radio::wifi::new(radio, wifi, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                warn!("wifi: peripheral init failed: {:?}; staying offline", err);
                return (BoardNetwork::Offline(OfflineLink::new()), None);
            }
        };

    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::<4>::new()),
        0x5A17_2B34_D099_EE11,
    );

    let supervisor = WifiSupervisor::new(controller, stack, &CONNECTIVITY, wifi_config);
    let link = EspWifiLink::new(&WIFI_CONTROL, &CONNECTIVITY);
    (BoardNetwork::Wifi(link), Some((runner, supervisor)))
}
