//! Network credentials, the link abstraction, and staged boot bring-up.

mod bring_up;
mod mock;
mod remote;

pub use bring_up::{BringUpOutcome, BringUpState, CredentialSource, NetworkBringUp};
pub use mock::{LinkScript, OfflineLink, ScriptedNetwork};
pub use remote::{LinkClient, LinkCommand, LinkControl, LinkDriver, LinkReply, LinkRequest, serve};

use heapless::String;

pub const SSID_BYTES: usize = 32;
pub const PASSWORD_BYTES: usize = 64;

pub const DEFAULT_PROVISIONING_SSID: &str = "SmartResponse-Setup";

/// Slack on top of the link's own association and DHCP bounds.
const CONNECT_MARGIN_MS: u64 = 1_000;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkCredentials {
    ssid: String<SSID_BYTES>,
    password: String<PASSWORD_BYTES>,
}

impl NetworkCredentials {
    /// `None` when either field does not fit the radio's limits.
    pub fn new(ssid: &str, password: &str) -> Option<Self> {
        let mut credentials = Self {
            ssid: String::new(),
            password: String::new(),
        };
        credentials.ssid.push_str(ssid).ok()?;
        credentials.password.push_str(password).ok()?;
        Some(credentials)
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Link state as shown on the standby screen.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WifiStatus {
    #[default]
    Offline,
    Connecting,
    Connected,
    Provisioning,
}

impl WifiStatus {
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Boot-time network policy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkConfig {
    /// Upper bound for a single connection attempt.
    pub connect_timeout_ms: u64,
    /// Firmware-baked network tried when the stored one fails.
    pub fallback: Option<NetworkCredentials>,
    pub provisioning_ssid: String<SSID_BYTES>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let mut provisioning_ssid = String::new();
        let _ = provisioning_ssid.push_str(DEFAULT_PROVISIONING_SSID);
        Self {
            connect_timeout_ms: 15_000,
            fallback: None,
            provisioning_ssid,
        }
    }
}

impl NetworkConfig {
    pub fn with_fallback(mut self, fallback: Option<NetworkCredentials>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_connect_timeout_ms(mut self, connect_timeout_ms: u64) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self
    }

    /// Bounds each attempt just past the link's own association and DHCP
    /// timeouts, so the link gives up and cleans up before the attempt is
    /// dropped.
    pub fn with_link_timeouts(self, association_ms: u64, dhcp_ms: u64) -> Self {
        self.with_connect_timeout_ms(
            association_ms
                .saturating_add(dhcp_ms)
                .saturating_add(CONNECT_MARGIN_MS),
        )
    }
}

/// Wireless link driven by boot bring-up and the event loop.
#[allow(async_fn_in_trait)]
pub trait NetworkLink {
    /// Starts the radio driver. `false` leaves the link permanently offline.
    fn init(&mut self) -> bool;

    /// One connection attempt. Callers bound it with their own timeout.
    async fn connect(&mut self, credentials: &NetworkCredentials) -> bool;

    /// Advertises the device's own access point for out-of-band setup.
    async fn start_provisioning_ap(&mut self, ap_ssid: &str) -> bool;

    /// Steady-state servicing (reconnects, link polling).
    async fn handle(&mut self, now_ms: u64);

    fn status(&self) -> WifiStatus;
}

#[cfg(test)]
mod tests;
