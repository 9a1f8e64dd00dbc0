//! Wi-Fi connectivity state shared between the link driver and the screens.

mod wifi;

pub use wifi::{EspWifiLink, WifiControl, WifiLinkConfig, WifiSupervisor, wifi_retry_backoff_secs};

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use smart_response_core::network::WifiStatus;

/// High-level connectivity state for UI + logs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ConnectivityState {
    Disconnected = 0,
    Connecting = 1,
    LinkUpNoIp = 2,
    Connected = 3,
    Provisioning = 4,
}

impl ConnectivityState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Connecting,
            2 => Self::LinkUpNoIp,
            3 => Self::Connected,
            4 => Self::Provisioning,
            _ => Self::Disconnected,
        }
    }

    const fn for_link(link_up: bool, has_ipv4: bool) -> Self {
        match (link_up, has_ipv4) {
            (false, _) => Self::Disconnected,
            (true, false) => Self::LinkUpNoIp,
            (true, true) => Self::Connected,
        }
    }
}

/// Immutable connectivity snapshot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectivitySnapshot {
    pub state: ConnectivityState,
    pub link_up: bool,
    pub has_ipv4: bool,
    pub revision: u32,
}

impl ConnectivitySnapshot {
    pub const fn wifi_status(self) -> WifiStatus {
        match self.state {
            ConnectivityState::Connected => WifiStatus::Connected,
            ConnectivityState::Connecting | ConnectivityState::LinkUpNoIp => {
                WifiStatus::Connecting
            }
            ConnectivityState::Provisioning => WifiStatus::Provisioning,
            ConnectivityState::Disconnected => WifiStatus::Offline,
        }
    }
}

/// Lock-free shared connectivity status.
#[derive(Debug)]
pub struct ConnectivityHandle {
    state: AtomicU8,
    link_up: AtomicBool,
    has_ipv4: AtomicBool,
    revision: AtomicU32,
}

impl ConnectivityHandle {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectivityState::Disconnected as u8),
            link_up: AtomicBool::new(false),
            has_ipv4: AtomicBool::new(false),
            revision: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> ConnectivitySnapshot {
        ConnectivitySnapshot {
            state: ConnectivityState::from_raw(self.state.load(Ordering::Acquire)),
            link_up: self.link_up.load(Ordering::Acquire),
            has_ipv4: self.has_ipv4.load(Ordering::Acquire),
            revision: self.revision.load(Ordering::Acquire),
        }
    }

    pub fn mark_connecting(&self) {
        self.publish(ConnectivityState::Connecting, None);
    }

    pub fn mark_provisioning(&self) {
        self.publish(ConnectivityState::Provisioning, Some((false, false)));
    }

    pub fn mark_disconnected(&self) {
        self.publish(ConnectivityState::Disconnected, Some((false, false)));
    }

    pub fn update_link_ip(&self, link_up: bool, has_ipv4: bool) {
        self.publish(
            ConnectivityState::for_link(link_up, has_ipv4),
            Some((link_up, has_ipv4)),
        );
    }

    /// The revision moves only when something observable changed.
    fn publish(&self, state: ConnectivityState, link: Option<(bool, bool)>) {
        let mut changed = self.state.swap(state as u8, Ordering::AcqRel) != state as u8;
        if let Some((link_up, has_ipv4)) = link {
            changed |= self.link_up.swap(link_up, Ordering::AcqRel) != link_up;
            changed |= self.has_ipv4.swap(has_ipv4, Ordering::AcqRel) != has_ipv4;
        }
        if changed {
            self.revision.fetch_add(1, Ordering::AcqRel);
        }
    }
}

impl Default for ConnectivityHandle {
    fn default() -> Self {
        Self::new()
    }
}
