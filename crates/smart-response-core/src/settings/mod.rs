//! Persisted key/value configuration (network credentials).

mod record;

pub use record::{CONFIG_RECORD_LEN, ConfigRecord, RecordError, checksum32};

use heapless::String;

use crate::network::NetworkCredentials;

pub const CONFIG_VALUE_BYTES: usize = 64;

pub type ConfigValue = String<CONFIG_VALUE_BYTES>;

/// Keys understood by the config store.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigKey {
    WifiSsid,
    WifiPassword,
}

impl ConfigKey {
    pub const COUNT: usize = 2;
    pub const ALL: [Self; Self::COUNT] = [Self::WifiSsid, Self::WifiPassword];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WifiSsid => "wifi_ssid",
            Self::WifiPassword => "wifi_password",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::WifiSsid => 0,
            Self::WifiPassword => 1,
        }
    }

    /// Longest value accepted for this key, in bytes.
    pub const fn max_len(self) -> usize {
        match self {
            Self::WifiSsid => 32,
            Self::WifiPassword => 64,
        }
    }
}

/// Abstract configuration persistence backend.
pub trait ConfigStore {
    type Error: core::fmt::Debug;

    /// Pull persisted values into memory. Called once during boot.
    fn load(&mut self) -> Result<(), Self::Error>;
    fn get(&self, key: ConfigKey) -> Option<&str>;

    /// Persists every entry in one write; on error nothing changes.
    fn save_all(&mut self, entries: &[(ConfigKey, &str)]) -> Result<(), Self::Error>;

    fn save(&mut self, key: ConfigKey, value: &str) -> Result<(), Self::Error> {
        self.save_all(&[(key, value)])
    }

    fn get_or<'a>(&'a self, key: ConfigKey, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MemoryStoreError {
    ValueTooLong,
    WriteRejected,
}

/// Volatile store; also the cache behind the flash-backed store.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryConfigStore {
    record: ConfigRecord,
    saves: u32,
    reject_writes: bool,
    reject_key: Option<ConfigKey>,
}

impl MemoryConfigStore {
    pub const fn new() -> Self {
        Self {
            record: ConfigRecord::empty(),
            saves: 0,
            reject_writes: false,
            reject_key: None,
        }
    }

    pub fn from_record(record: ConfigRecord) -> Self {
        Self {
            record,
            ..Self::new()
        }
    }

    /// Seeds a value without counting it as a save.
    pub fn with_entry(mut self, key: ConfigKey, value: &str) -> Self {
        if self.record.set(key, value).is_err() {
            log::warn!("settings: seed value too long key={}", key.as_str());
        }
        self
    }

    pub fn rejecting_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    /// Fails any write that touches `key`.
    pub fn rejecting_key(mut self, key: ConfigKey) -> Self {
        self.reject_key = Some(key);
        self
    }

    pub fn save_count(&self) -> u32 {
        self.saves
    }

    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    pub fn replace_record(&mut self, record: ConfigRecord) {
        self.record = record;
    }
}

impl ConfigStore for MemoryConfigStore {
    type Error = MemoryStoreError;

    fn load(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn get(&self, key: ConfigKey) -> Option<&str> {
        self.record.get(key)
    }

    fn save_all(&mut self, entries: &[(ConfigKey, &str)]) -> Result<(), Self::Error> {
        if self.reject_writes {
            return Err(MemoryStoreError::WriteRejected);
        }
        let mut next = self.record.clone();
        for (key, value) in entries {
            if self.reject_key == Some(*key) {
                return Err(MemoryStoreError::WriteRejected);
            }
            next.set(*key, value)
                .map_err(|_| MemoryStoreError::ValueTooLong)?;
        }
        self.record = next;
        self.saves = self.saves.saturating_add(1);
        Ok(())
    }
}

/// Stored credentials, or `None` when the stored SSID is missing or empty.
pub fn load_credentials<S: ConfigStore>(store: &S) -> Option<NetworkCredentials> {
    let ssid = store.get_or(ConfigKey::WifiSsid, "");
    if ssid.is_empty() {
        return None;
    }
    NetworkCredentials::new(ssid, store.get_or(ConfigKey::WifiPassword, ""))
}

pub fn store_credentials<S: ConfigStore>(
    store: &mut S,
    credentials: &NetworkCredentials,
) -> Result<(), S::Error> {
    store.save_all(&[
        (ConfigKey::WifiSsid, credentials.ssid()),
        (ConfigKey::WifiPassword, credentials.password()),
    ])
}

#[cfg(test)]
mod tests;
