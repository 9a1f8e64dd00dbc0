use embassy_futures::select::{Either, select};
use heapless::Vec;
use log::{info, warn};

use super::{NetworkConfig, NetworkCredentials, NetworkLink};
use crate::{
    settings::{ConfigStore, load_credentials, store_credentials},
    time::Clock,
};

const TRACE_CAPACITY: usize = 5;

/// Boot-time connection stages. `Connected` and `ProvisioningMode` are terminal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BringUpState {
    Idle,
    TryStored,
    TryDefault,
    ProvisioningMode,
    Connected,
}

impl BringUpState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Connected | Self::ProvisioningMode)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::TryStored => "try_stored",
            Self::TryDefault => "try_default",
            Self::ProvisioningMode => "provisioning",
            Self::Connected => "connected",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CredentialSource {
    Stored,
    Fallback,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BringUpOutcome {
    pub state: BringUpState,
    pub source: Option<CredentialSource>,
    /// Fallback credentials were written to the config store.
    pub persisted: bool,
    /// Every state entered, in order, starting with `Idle`.
    pub trace: Vec<BringUpState, TRACE_CAPACITY>,
}

impl BringUpOutcome {
    pub const fn is_connected(&self) -> bool {
        matches!(self.state, BringUpState::Connected)
    }
}

/// Strictly linear fallback: stored network, then the firmware default,
/// then provisioning. Runs once per boot.
#[derive(Debug)]
pub struct NetworkBringUp<'a> {
    config: &'a NetworkConfig,
    state: BringUpState,
    trace: Vec<BringUpState, TRACE_CAPACITY>,
}

impl<'a> NetworkBringUp<'a> {
    pub fn new(config: &'a NetworkConfig) -> Self {
        let mut trace = Vec::new();
        let _ = trace.push(BringUpState::Idle);
        Self {
            config,
            state: BringUpState::Idle,
            trace,
        }
    }

    pub const fn state(&self) -> BringUpState {
        self.state
    }

    pub async fn run<L, S, C>(mut self, link: &mut L, store: &mut S, clock: &C) -> BringUpOutcome
    where
        L: NetworkLink,
        S: ConfigStore,
        C: Clock,
    {
        let stored = load_credentials(store);
        let mut source = None;
        let mut persisted = false;

        let mut next = if stored.is_some() {
            BringUpState::TryStored
        } else {
            info!("net: no stored ssid; skipping to fallback network");
            BringUpState::TryDefault
        };

        loop {
            self.enter(next);
            next = match self.state {
                BringUpState::Idle | BringUpState::TryStored => match stored.as_ref() {
                    Some(credentials)
                        if self.attempt(link, credentials, clock).await =>
                    {
                        source = Some(CredentialSource::Stored);
                        BringUpState::Connected
                    }
                    _ => BringUpState::TryDefault,
                },
                BringUpState::TryDefault => match self.config.fallback.as_ref() {
                    Some(fallback) if self.attempt(link, fallback, clock).await => {
                        source = Some(CredentialSource::Fallback);
                        persisted = match store_credentials(store, fallback) {
                            Ok(()) => {
                                info!("net: fallback credentials saved ssid={}", fallback.ssid());
                                true
                            }
                            Err(err) => {
                                warn!("net: saving fallback credentials failed: {:?}", err);
                                false
                            }
                        };
                        BringUpState::Connected
                    }
                    Some(_) => BringUpState::ProvisioningMode,
                    None => {
                        warn!("net: no fallback network configured");
                        BringUpState::ProvisioningMode
                    }
                },
                BringUpState::ProvisioningMode => {
                    let ap_ssid = self.config.provisioning_ssid.as_str();
                    if link.start_provisioning_ap(ap_ssid).await {
                        info!("net: provisioning access point up ssid={}", ap_ssid);
                    } else {
                        warn!("net: provisioning access point failed to start");
                    }
                    break;
                }
                BringUpState::Connected => break,
            };
        }

        BringUpOutcome {
            state: self.state,
            source,
            persisted,
            trace: self.trace,
        }
    }

    async fn attempt<L, C>(&self, link: &mut L, credentials: &NetworkCredentials, clock: &C) -> bool
    where
        L: NetworkLink,
        C: Clock,
    {
        let timeout_ms = self.config.connect_timeout_ms;
        info!(
            "net: {} connecting ssid={} timeout_ms={}",
            self.state.label(),
            credentials.ssid(),
            timeout_ms
        );

        match select(link.connect(credentials), clock.sleep_ms(timeout_ms)).await {
            Either::First(true) => {
                info!("net: connected ssid={}", credentials.ssid());
                true
            }
            Either::First(false) => {
                warn!("net: connect failed ssid={}", credentials.ssid());
                false
            }
            Either::Second(()) => {
                warn!(
                    "net: connect timed out ssid={} after {}ms",
                    credentials.ssid(),
                    timeout_ms
                );
                false
            }
        }
    }

    fn enter(&mut self, next: BringUpState) {
        self.state = next;
        let _ = self.trace.push(next);
    }
}
