//! Call-tracing fakes shared by the boot, event loop, and UI tests.

use std::{cell::RefCell, rc::Rc, string::String, vec::Vec};

use crate::{
    config::DeviceConfig,
    device::{Board, DeviceState, Hardware},
    input::ScriptedInput,
    network::{NetworkConfig, NetworkCredentials, ScriptedNetwork},
    peripherals::{
        AudioDevice, BatteryGauge, BatteryReading, DateTime, Peripheral, PeripheralHealth,
        RealTimeClock,
    },
    render::RecordingToolkit,
    settings::MemoryConfigStore,
    time::ManualClock,
};

pub const FALLBACK_SSID: &str = "BE3600";
pub const FALLBACK_PASSWORD: &str = "19930101";

pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

fn record(log: &CallLog, entry: &str) {
    log.borrow_mut().push(entry.to_owned());
}

pub struct FakeBattery {
    log: CallLog,
    ok: bool,
    reading: Option<BatteryReading>,
}

impl Peripheral for FakeBattery {
    fn name(&self) -> &'static str {
        "battery"
    }

    fn init(&mut self) -> bool {
        record(&self.log, "battery.init");
        self.ok
    }
}

impl BatteryGauge for FakeBattery {
    fn update(&mut self, _now_ms: u64) {
        record(&self.log, "battery.update");
    }

    fn reading(&self) -> Option<BatteryReading> {
        if self.ok { self.reading } else { None }
    }
}

pub struct FakeRtc {
    log: CallLog,
    ok: bool,
}

impl Peripheral for FakeRtc {
    fn name(&self) -> &'static str {
        "rtc"
    }

    fn init(&mut self) -> bool {
        record(&self.log, "rtc.init");
        self.ok
    }
}

impl RealTimeClock for FakeRtc {
    fn now(&mut self) -> Option<DateTime> {
        Some(DateTime {
            year: 2026,
            month: 10,
            day: 19,
            hour: 8,
            minute: 30,
            second: 5,
        })
    }
}

pub struct FakePeripheral {
    log: CallLog,
    name: &'static str,
    ok: bool,
}

impl Peripheral for FakePeripheral {
    fn name(&self) -> &'static str {
        self.name
    }

    fn init(&mut self) -> bool {
        record(&self.log, &format!("{}.init", self.name));
        self.ok
    }
}

pub struct FakeAudio {
    log: CallLog,
    ok: bool,
}

impl Peripheral for FakeAudio {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn init(&mut self) -> bool {
        record(&self.log, "audio.init");
        self.ok
    }
}

impl AudioDevice for FakeAudio {
    fn process(&mut self) {
        record(&self.log, "audio.process");
    }
}

pub struct TestBoard;

impl Board for TestBoard {
    type Toolkit = RecordingToolkit;
    type Clock = ManualClock;
    type Battery = FakeBattery;
    type Rtc = FakeRtc;
    type Motion = FakePeripheral;
    type Storage = FakePeripheral;
    type Audio = FakeAudio;
    type Config = MemoryConfigStore;
    type Network = ScriptedNetwork;
    type Input = ScriptedInput<'static>;
}

/// Which fakes fail their `init()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Failures {
    pub battery: bool,
    pub rtc: bool,
    pub motion: bool,
    pub storage: bool,
    pub audio: bool,
}

pub fn hardware(
    log: &CallLog,
    config: MemoryConfigStore,
    network: ScriptedNetwork,
    input: &'static [crate::input::InputEvent],
    failures: Failures,
) -> Hardware<TestBoard> {
    Hardware {
        battery: FakeBattery {
            log: log.clone(),
            ok: !failures.battery,
            reading: Some(BatteryReading::new(76, false)),
        },
        rtc: FakeRtc {
            log: log.clone(),
            ok: !failures.rtc,
        },
        motion: FakePeripheral {
            log: log.clone(),
            name: "motion",
            ok: !failures.motion,
        },
        storage: FakePeripheral {
            log: log.clone(),
            name: "storage",
            ok: !failures.storage,
        },
        audio: FakeAudio {
            log: log.clone(),
            ok: !failures.audio,
        },
        config,
        network,
        input: ScriptedInput::new(input),
        health: PeripheralHealth::default(),
    }
}

pub fn device_config() -> DeviceConfig {
    DeviceConfig::default().with_network(
        NetworkConfig::default()
            .with_fallback(NetworkCredentials::new(FALLBACK_SSID, FALLBACK_PASSWORD))
            .with_connect_timeout_ms(2_000),
    )
}

pub fn device_state(display_ok: bool) -> DeviceState<TestBoard> {
    let toolkit = display_ok.then(RecordingToolkit::new);
    DeviceState::new(
        device_config(),
        ManualClock::new(0)
            .with_read_step_ms(1)
            .with_yielding_sleep(),
        toolkit,
    )
}
