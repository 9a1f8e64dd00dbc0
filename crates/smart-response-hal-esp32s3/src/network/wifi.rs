use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer, WithTimeout};
use esp_radio::wifi::{AccessPointConfig, ClientConfig, ModeConfig, WifiController};
use heapless::String;
use log::{debug, info, warn};
use smart_response_core::network::{
    LinkClient, LinkCommand, LinkControl, LinkDriver, NetworkCredentials, NetworkLink, WifiStatus,
};

use super::ConnectivityHandle;

const WIFI_RETRY_BACKOFF_MIN_SECS: u64 = 2;
const WIFI_RETRY_BACKOFF_MAX_SECS: u64 = 120;

/// Request hand-off between the event loop and [`WifiSupervisor`].
pub type WifiControl = LinkControl<CriticalSectionRawMutex>;

#[derive(Debug, Clone, Copy)]
pub struct WifiLinkConfig {
    association_timeout_secs: u64,
    dhcp_timeout_secs: u64,
    poll_interval_ms: u64,
}

impl Default for WifiLinkConfig {
    fn default() -> Self {
        Self {
            association_timeout_secs: 10,
            dhcp_timeout_secs: 15,
            poll_interval_ms: 500,
        }
    }
}

impl WifiLinkConfig {
    pub const fn with_association_timeout_secs(mut self, association_timeout_secs: u64) -> Self {
        self.association_timeout_secs = association_timeout_secs;
        self
    }

    pub const fn with_dhcp_timeout_secs(mut self, dhcp_timeout_secs: u64) -> Self {
        self.dhcp_timeout_secs = dhcp_timeout_secs;
        self
    }

    pub const fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub const fn association_timeout_ms(&self) -> u64 {
        self.association_timeout_secs * 1_000
    }

    pub const fn dhcp_timeout_ms(&self) -> u64 {
        self.dhcp_timeout_secs * 1_000
    }
}

pub fn wifi_retry_backoff_secs(consecutive_failures: u32) -> u64 {
    // 2, 4, 8, 16, 32, 64, 120, 120, ...
    let shift = consecutive_failures.min(6);
    WIFI_RETRY_BACKOFF_MIN_SECS
        .saturating_mul(1u64 << shift)
        .min(WIFI_RETRY_BACKOFF_MAX_SECS)
}

/// The event loop's view of the radio: requests go to the supervisor, status
/// comes from the shared connectivity atomics. Nothing here blocks on the air.
pub struct EspWifiLink {
    client: LinkClient<'static, CriticalSectionRawMutex>,
    connectivity: &'static ConnectivityHandle,
    seen_revision: u32,
}

impl EspWifiLink {
    pub const fn new(
        control: &'static WifiControl,
        connectivity: &'static ConnectivityHandle,
    ) -> Self {
        Self {
            client: LinkClient::new(control),
            connectivity,
            seen_revision: 0,
        }
    }
}

impl NetworkLink for EspWifiLink {
    fn init(&mut self) -> bool {
        self.connectivity.mark_disconnected();
        true
    }

    async fn connect(&mut self, credentials: &NetworkCredentials) -> bool {
        self.client
            .request(LinkCommand::Connect(credentials.clone()))
            .await
    }

    async fn start_provisioning_ap(&mut self, ap_ssid: &str) -> bool {
        let mut ssid = String::new();
        if ssid.push_str(ap_ssid).is_err() {
            warn!("wifi: access point ssid too long: {}", ap_ssid);
            return false;
        }
        self.client.request(LinkCommand::StartAccessPoint(ssid)).await
    }

    async fn handle(&mut self, _now_ms: u64) {
        let snapshot = self.connectivity.snapshot();
        if snapshot.revision != self.seen_revision {
            self.seen_revision = snapshot.revision;
            info!(
                "wifi: state={:?} link_up={} has_ipv4={}",
                snapshot.state, snapshot.link_up, snapshot.has_ipv4
            );
        }
    }

    fn status(&self) -> WifiStatus {
        self.connectivity.snapshot().wifi_status()
    }
}

/// Owns the controller. Runs requests from [`EspWifiLink`] and, between
/// them, watches the link and reconnects with exponential backoff.
pub struct WifiSupervisor<'d> {
    controller: WifiController<'d>,
    stack: Stack<'d>,
    connectivity: &'static ConnectivityHandle,
    config: WifiLinkConfig,
    credentials: Option<NetworkCredentials>,
    access_point: bool,
    consecutive_failures: u32,
}

impl<'d> WifiSupervisor<'d> {
    pub fn new(
        controller: WifiController<'d>,
        stack: Stack<'d>,
        connectivity: &'static ConnectivityHandle,
        config: WifiLinkConfig,
    ) -> Self {
        Self {
            controller,
            stack,
            connectivity,
            config,
            credentials: None,
            access_point: false,
            consecutive_failures: 0,
        }
    }

    async fn ensure_started(&mut self) -> bool {
        if self.controller.is_started().unwrap_or(false) {
            return true;
        }
        match self.controller.start_async().await {
            Ok(()) => true,
            Err(err) => {
                warn!("wifi: start failed: {:?}", err);
                false
            }
        }
    }

    /// Drops whatever an earlier, possibly abandoned, request left behind.
    async fn reset_link(&mut self) {
        if self.access_point {
            if let Err(err) = self.controller.stop_async().await {
                warn!("wifi: stopping access point failed: {:?}", err);
            }
            self.access_point = false;
        } else if !matches!(self.controller.is_connected(), Ok(false)) {
            let _ = self.controller.disconnect_async().await;
        }
        self.connectivity.mark_disconnected();
    }

    async fn associate(&mut self, credentials: &NetworkCredentials) -> bool {
        self.reset_link().await;
        self.connectivity.mark_connecting();

        let client_config = ClientConfig::default()
            .with_ssid(credentials.ssid().into())
            .with_password(credentials.password().into());
        if let Err(err) = self.controller.set_config(&ModeConfig::Client(client_config)) {
            warn!("wifi: client config failed: {:?}", err);
            self.connectivity.mark_disconnected();
            return false;
        }
        if !self.ensure_started().await {
            self.connectivity.mark_disconnected();
            return false;
        }

        let associated = match self
            .controller
            .connect_async()
            .with_timeout(Duration::from_secs(self.config.association_timeout_secs))
            .await
        {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!("wifi: connect failed ssid={}: {:?}", credentials.ssid(), err);
                false
            }
            Err(_) => {
                warn!("wifi: association timeout ssid={}", credentials.ssid());
                false
            }
        };
        if !associated {
            self.connectivity.mark_disconnected();
            let _ = self.controller.disconnect_async().await;
            return false;
        }

        match self
            .stack
            .wait_config_up()
            .with_timeout(Duration::from_secs(self.config.dhcp_timeout_secs))
            .await
        {
            Ok(()) => {
                self.connectivity
                    .update_link_ip(self.stack.is_link_up(), self.stack.config_v4().is_some());
                info!("wifi: connected and dhcp ready ssid={}", credentials.ssid());
                self.consecutive_failures = 0;
                true
            }
            Err(_) => {
                warn!("wifi: dhcp timeout ssid={}", credentials.ssid());
                self.connectivity.update_link_ip(self.stack.is_link_up(), false);
                let _ = self.controller.disconnect_async().await;
                false
            }
        }
    }

    async fn start_access_point(&mut self, ssid: &str) -> bool {
        self.reset_link().await;
        if self.controller.is_started().unwrap_or(false)
            && let Err(err) = self.controller.stop_async().await
        {
            warn!("wifi: stop before provisioning failed: {:?}", err);
        }

        let ap_config = AccessPointConfig::default().with_ssid(ssid.into());
        if let Err(err) = self.controller.set_config(&ModeConfig::AccessPoint(ap_config)) {
            warn!("wifi: access point config failed: {:?}", err);
            return false;
        }
        if !self.ensure_started().await {
            return false;
        }

        self.access_point = true;
        self.connectivity.mark_provisioning();
        info!("wifi: provisioning access point up ssid={}", ssid);
        true
    }
}

impl LinkDriver for WifiSupervisor<'_> {
    async fn execute(&mut self, command: &LinkCommand) -> bool {
        // Only a request that succeeds becomes the network to keep alive.
        self.credentials = None;
        match command {
            LinkCommand::Connect(credentials) => {
                let connected = self.associate(credentials).await;
                if connected {
                    self.credentials = Some(credentials.clone());
                }
                connected
            }
            LinkCommand::StartAccessPoint(ssid) => self.start_access_point(ssid).await,
        }
    }

    async fn supervise(&mut self) {
        Timer::after_millis(self.config.poll_interval_ms).await;
        if self.access_point {
            return;
        }
        let Some(credentials) = self.credentials.clone() else {
            return;
        };

        let link_up = self.stack.is_link_up();
        let has_ipv4 = self.stack.config_v4().is_some();
        let is_connected = matches!(self.controller.is_connected(), Ok(true));
        self.connectivity.update_link_ip(link_up, has_ipv4);

        if link_up && has_ipv4 && is_connected {
            debug!("wifi: link healthy");
            return;
        }

        info!(
            "wifi: state lost (link_up={} has_ipv4={} connected={}); reconnecting",
            link_up, has_ipv4, is_connected
        );
        self.connectivity.mark_disconnected();
        let _ = self.controller.disconnect_async().await;

        let delay_secs = wifi_retry_backoff_secs(self.consecutive_failures);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        info!(
            "wifi: retrying in {}s (consecutive_failures={})",
            delay_secs, self.consecutive_failures
        );
        Timer::after_secs(delay_secs).await;

        if !self.associate(&credentials).await {
            info!("wifi: reconnect to ssid={} failed", credentials.ssid());
        }
    }
}
