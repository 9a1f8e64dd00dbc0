use heapless::{String, Vec};

use super::{NetworkCredentials, NetworkLink, SSID_BYTES, WifiStatus};

/// Link used when the radio could not be brought up at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineLink;

impl OfflineLink {
    pub const fn new() -> Self {
        Self
    }
}

impl NetworkLink for OfflineLink {
    fn init(&mut self) -> bool {
        false
    }

    async fn connect(&mut self, _credentials: &NetworkCredentials) -> bool {
        false
    }

    async fn start_provisioning_ap(&mut self, _ap_ssid: &str) -> bool {
        false
    }

    async fn handle(&mut self, _now_ms: u64) {}

    fn status(&self) -> WifiStatus {
        WifiStatus::Offline
    }
}

/// How a scripted network answers a connection attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkScript {
    Accept,
    Reject,
    /// Never completes; only a caller-side timeout ends the attempt.
    Hang,
}

/// Deterministic link for host runs: reachable networks are listed up front.
#[derive(Debug, Default)]
pub struct ScriptedNetwork {
    networks: Vec<(String<SSID_BYTES>, LinkScript), 4>,
    attempts: Vec<String<SSID_BYTES>, 8>,
    provisioning_ssid: Option<String<SSID_BYTES>>,
    status: WifiStatus,
    init_calls: u32,
    handle_calls: u32,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network(mut self, ssid: &str, script: LinkScript) -> Self {
        let mut name = String::new();
        let _ = name.push_str(ssid);
        let _ = self.networks.push((name, script));
        self
    }

    /// SSIDs passed to `connect`, in order.
    pub fn attempts(&self) -> &[String<SSID_BYTES>] {
        &self.attempts
    }

    pub fn provisioning_ssid(&self) -> Option<&str> {
        self.provisioning_ssid.as_deref()
    }

    pub fn init_calls(&self) -> u32 {
        self.init_calls
    }

    pub fn handle_calls(&self) -> u32 {
        self.handle_calls
    }

    fn script_for(&self, ssid: &str) -> LinkScript {
        self.networks
            .iter()
            .find(|(name, _)| name.as_str() == ssid)
            .map(|(_, script)| *script)
            .unwrap_or(LinkScript::Reject)
    }
}

impl NetworkLink for ScriptedNetwork {
    fn init(&mut self) -> bool {
        self.init_calls = self.init_calls.saturating_add(1);
        true
    }

    async fn connect(&mut self, credentials: &NetworkCredentials) -> bool {
        let mut name = String::new();
        let _ = name.push_str(credentials.ssid());
        let _ = self.attempts.push(name);
        self.status = WifiStatus::Connecting;

        match self.script_for(credentials.ssid()) {
            LinkScript::Accept => {
                self.status = WifiStatus::Connected;
                true
            }
            LinkScript::Reject => {
                self.status = WifiStatus::Offline;
                false
            }
            LinkScript::Hang => {
                core::future::pending::<()>().await;
                false
            }
        }
    }

    async fn start_provisioning_ap(&mut self, ap_ssid: &str) -> bool {
        let mut name = String::new();
        let _ = name.push_str(ap_ssid);
        self.provisioning_ssid = Some(name);
        self.status = WifiStatus::Provisioning;
        true
    }

    async fn handle(&mut self, _now_ms: u64) {
        self.handle_calls = self.handle_calls.saturating_add(1);
    }

    fn status(&self) -> WifiStatus {
        self.status
    }
}
