use embassy_futures::block_on;

use super::*;
use crate::{
    settings::{ConfigKey, ConfigStore, MemoryConfigStore},
    time::ManualClock,
};

const FALLBACK_SSID: &str = "BE3600";
const FALLBACK_PASSWORD: &str = "19930101";

fn config_with_fallback() -> NetworkConfig {
    NetworkConfig::default()
        .with_fallback(NetworkCredentials::new(FALLBACK_SSID, FALLBACK_PASSWORD))
        .with_connect_timeout_ms(1_000)
}

fn stored(ssid: &str, password: &str) -> MemoryConfigStore {
    MemoryConfigStore::new()
        .with_entry(ConfigKey::WifiSsid, ssid)
        .with_entry(ConfigKey::WifiPassword, password)
}

#[test]
fn empty_stored_ssid_goes_straight_to_fallback() {
    let config = config_with_fallback();
    let mut link = ScriptedNetwork::new().with_network(FALLBACK_SSID, LinkScript::Accept);
    let mut store = stored("", "");
    let clock = ManualClock::new(0);

    let outcome = block_on(NetworkBringUp::new(&config).run(&mut link, &mut store, &clock));

    assert_eq!(
        outcome.trace.as_slice(),
        &[
            BringUpState::Idle,
            BringUpState::TryDefault,
            BringUpState::Connected
        ]
    );
    assert_eq!(link.attempts().len(), 1);
}

#[test]
fn stored_network_success_persists_nothing_new() {
    let config = config_with_fallback();
    let mut link = ScriptedNetwork::new().with_network("home", LinkScript::Accept);
    let mut store = stored("home", "pw");
    let before = store.clone();
    let clock = ManualClock::new(0);

    let outcome = block_on(NetworkBringUp::new(&config).run(&mut link, &mut store, &clock));

    assert_eq!(outcome.state, BringUpState::Connected);
    assert_eq!(outcome.source, Some(CredentialSource::Stored));
    assert!(!outcome.persisted);
    assert_eq!(store, before);
    assert!(link.provisioning_ssid().is_none());
}

#[test]
fn fallback_success_persists_fallback_credentials() {
    let config = config_with_fallback();
    let mut link = ScriptedNetwork::new().with_network(FALLBACK_SSID, LinkScript::Accept);
    let mut store = MemoryConfigStore::new();
    let clock = ManualClock::new(0);

    let outcome = block_on(NetworkBringUp::new(&config).run(&mut link, &mut store, &clock));

    assert!(outcome.is_connected());
    assert_eq!(outcome.source, Some(CredentialSource::Fallback));
    assert!(outcome.persisted);
    assert_eq!(store.get(ConfigKey::WifiSsid), Some(FALLBACK_SSID));
    assert_eq!(store.get(ConfigKey::WifiPassword), Some(FALLBACK_PASSWORD));
}

#[test]
fn stored_failure_falls_back_in_order() {
    let config = config_with_fallback();
    let mut link = ScriptedNetwork::new().with_network(FALLBACK_SSID, LinkScript::Accept);
    let mut store = stored("moved-away", "pw");
    let clock = ManualClock::new(0);

    let outcome = block_on(NetworkBringUp::new(&config).run(&mut link, &mut store, &clock));

    let attempts: Vec<&str> = link.attempts().iter().map(|s| s.as_str()).collect();
    assert_eq!(attempts, ["moved-away", FALLBACK_SSID]);
    assert_eq!(
        outcome.trace.as_slice(),
        &[
            BringUpState::Idle,
            BringUpState::TryStored,
            BringUpState::TryDefault,
            BringUpState::Connected
        ]
    );
}

#[test]
fn nothing_reachable_ends_in_provisioning() {
    let config = config_with_fallback();
    let mut link = ScriptedNetwork::new();
    let mut store = stored("home", "pw");
    let clock = ManualClock::new(0);

    let outcome = block_on(NetworkBringUp::new(&config).run(&mut link, &mut store, &clock));

    assert_eq!(outcome.state, BringUpState::ProvisioningMode);
    assert!(outcome.state.is_terminal());
    assert_eq!(link.provisioning_ssid(), Some(DEFAULT_PROVISIONING_SSID));
    assert_eq!(link.status(), WifiStatus::Provisioning);
    assert_eq!(store.get(ConfigKey::WifiSsid), Some("home"));
}

#[test]
fn hanging_attempt_is_bounded_by_the_timeout() {
    let config = config_with_fallback();
    let mut link = ScriptedNetwork::new()
        .with_network("slow", LinkScript::Hang)
        .with_network(FALLBACK_SSID, LinkScript::Accept);
    let mut store = stored("slow", "pw");
    let clock = ManualClock::new(0);

    let outcome = block_on(NetworkBringUp::new(&config).run(&mut link, &mut store, &clock));

    assert_eq!(outcome.source, Some(CredentialSource::Fallback));
    assert!(clock.slept_ms() >= config.connect_timeout_ms);
}

#[test]
fn missing_fallback_skips_to_provisioning() {
    let config = NetworkConfig::default();
    let mut link = ScriptedNetwork::new();
    let mut store = MemoryConfigStore::new();
    let clock = ManualClock::new(0);

    let outcome = block_on(NetworkBringUp::new(&config).run(&mut link, &mut store, &clock));

    assert_eq!(outcome.state, BringUpState::ProvisioningMode);
    assert!(link.attempts().is_empty());
}

#[test]
fn failed_persist_still_reports_connected() {
    let config = config_with_fallback();
    let mut link = ScriptedNetwork::new().with_network(FALLBACK_SSID, LinkScript::Accept);
    let mut store = MemoryConfigStore::new().rejecting_writes();
    let clock = ManualClock::new(0);

    let outcome = block_on(NetworkBringUp::new(&config).run(&mut link, &mut store, &clock));

    assert!(outcome.is_connected());
    assert!(!outcome.persisted);
}

#[test]
fn credentials_reject_oversized_ssid() {
    assert!(NetworkCredentials::new(&"x".repeat(33), "").is_none());
    assert!(NetworkCredentials::new(&"x".repeat(32), "").is_some());
}

#[test]
fn attempt_bound_covers_association_and_dhcp() {
    let config = NetworkConfig::default().with_link_timeouts(10_000, 15_000);

    assert!(config.connect_timeout_ms > 10_000 + 15_000);
}

mod remote {
    use std::{string::String as StdString, vec::Vec};

    use embassy_futures::{
        block_on,
        select::{Either, select},
        yield_now,
    };
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    use super::super::*;

    #[derive(Default)]
    struct RecordingDriver {
        executed: Vec<StdString>,
        supervise_steps: u32,
    }

    impl LinkDriver for RecordingDriver {
        async fn execute(&mut self, command: &LinkCommand) -> bool {
            match command {
                LinkCommand::Connect(credentials) => {
                    self.executed.push(credentials.ssid().into());
                    match credentials.ssid() {
                        "hangs" => core::future::pending::<bool>().await,
                        "rejects" => false,
                        _ => true,
                    }
                }
                LinkCommand::StartAccessPoint(ssid) => {
                    self.executed.push(ssid.as_str().into());
                    true
                }
            }
        }

        async fn supervise(&mut self) {
            self.supervise_steps += 1;
            yield_now().await;
        }
    }

    fn connect(ssid: &str) -> LinkCommand {
        LinkCommand::Connect(NetworkCredentials::new(ssid, "pw").unwrap())
    }

    fn run<F: core::future::Future<Output = bool>>(
        control: &LinkControl<NoopRawMutex>,
        driver: &mut RecordingDriver,
        caller: F,
    ) -> bool {
        match block_on(select(serve(control, driver), caller)) {
            Either::First(never) => match never {},
            Either::Second(ok) => ok,
        }
    }

    #[test]
    fn dropped_request_is_superseded_by_the_next_one() {
        let control = LinkControl::<NoopRawMutex>::new();
        let mut driver = RecordingDriver::default();
        let mut client = LinkClient::new(&control);

        let ok = run(&control, &mut driver, async {
            let first = select(client.request(connect("hangs")), async {
                yield_now().await;
                yield_now().await;
            })
            .await;
            assert!(matches!(first, Either::Second(())));
            client.request(connect("home")).await
        });

        assert!(ok);
        assert_eq!(driver.executed, ["hangs", "home"]);
    }

    #[test]
    fn driver_result_reaches_the_caller() {
        let control = LinkControl::<NoopRawMutex>::new();
        let mut driver = RecordingDriver::default();
        let mut client = LinkClient::new(&control);

        let ok = run(&control, &mut driver, async {
            let rejected = client.request(connect("rejects")).await;
            let mut ap = heapless::String::new();
            ap.push_str(DEFAULT_PROVISIONING_SSID).unwrap();
            let advertised = client.request(LinkCommand::StartAccessPoint(ap)).await;
            !rejected && advertised
        });

        assert!(ok);
        assert_eq!(driver.executed, ["rejects", DEFAULT_PROVISIONING_SSID]);
    }

    #[test]
    fn idle_driver_keeps_supervising() {
        let control = LinkControl::<NoopRawMutex>::new();
        let mut driver = RecordingDriver::default();
        let mut client = LinkClient::new(&control);

        run(&control, &mut driver, async {
            for _ in 0..4 {
                yield_now().await;
            }
            client.request(connect("home")).await
        });

        assert!(driver.supervise_steps >= 2);
        assert_eq!(driver.executed, ["home"]);
    }
}
