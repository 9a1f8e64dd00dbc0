use super::{CONFIG_VALUE_BYTES, ConfigKey, ConfigValue};

pub const CONFIG_RECORD_LEN: usize = 108;

const RECORD_MAGIC: u32 = 0x3143_5253; // "SRC1"
const RECORD_VERSION: u8 = 1;

const FLAGS_OFFSET: usize = 5;
const LENGTHS_OFFSET: usize = 6;
const SSID_OFFSET: usize = 8;
const PASSWORD_OFFSET: usize = 40;
const CHECKSUM_OFFSET: usize = 104;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordError {
    ValueTooLong,
    Corrupted,
}

/// Fixed-layout snapshot of every config key.
///
/// Layout (little endian): magic u32, version u8, presence flags u8, one
/// length byte per key, SSID slot (32 B), password slot (64 B), FNV-1a
/// checksum over everything before it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigRecord {
    values: [Option<ConfigValue>; ConfigKey::COUNT],
}

impl ConfigRecord {
    pub const fn empty() -> Self {
        Self {
            values: [None, None],
        }
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.values[key.index()].as_ref().map(|value| value.as_str())
    }

    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), RecordError> {
        if value.len() > key.max_len() {
            return Err(RecordError::ValueTooLong);
        }
        let mut stored = ConfigValue::new();
        stored
            .push_str(value)
            .map_err(|_| RecordError::ValueTooLong)?;
        self.values[key.index()] = Some(stored);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    pub fn encode(&self) -> [u8; CONFIG_RECORD_LEN] {
        let mut buf = [0u8; CONFIG_RECORD_LEN];
        buf[0..4].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
        buf[4] = RECORD_VERSION;

        let mut flags = 0u8;
        for key in ConfigKey::ALL {
            let Some(value) = self.get(key) else {
                continue;
            };
            flags |= 1 << key.index();
            buf[LENGTHS_OFFSET + key.index()] = value.len() as u8;
            let start = slot_offset(key);
            buf[start..start + value.len()].copy_from_slice(value.as_bytes());
        }
        buf[FLAGS_OFFSET] = flags;

        let checksum = checksum32(&buf[..CHECKSUM_OFFSET]);
        buf[CHECKSUM_OFFSET..].copy_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// `Ok(None)` for erased flash, foreign data, or a newer layout.
    pub fn decode(buf: &[u8; CONFIG_RECORD_LEN]) -> Result<Option<Self>, RecordError> {
        if buf.iter().all(|b| *b == 0xFF) {
            return Ok(None);
        }

        let magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if magic != RECORD_MAGIC || buf[4] != RECORD_VERSION {
            return Ok(None);
        }

        let expected = u32::from_le_bytes([
            buf[CHECKSUM_OFFSET],
            buf[CHECKSUM_OFFSET + 1],
            buf[CHECKSUM_OFFSET + 2],
            buf[CHECKSUM_OFFSET + 3],
        ]);
        if checksum32(&buf[..CHECKSUM_OFFSET]) != expected {
            return Err(RecordError::Corrupted);
        }

        let flags = buf[FLAGS_OFFSET];
        let mut record = Self::empty();
        for key in ConfigKey::ALL {
            if flags & (1 << key.index()) == 0 {
                continue;
            }
            let len = buf[LENGTHS_OFFSET + key.index()] as usize;
            if len > key.max_len() {
                return Err(RecordError::Corrupted);
            }
            let start = slot_offset(key);
            let text = core::str::from_utf8(&buf[start..start + len])
                .map_err(|_| RecordError::Corrupted)?;
            record.set(key, text)?;
        }

        Ok(Some(record))
    }
}

const fn slot_offset(key: ConfigKey) -> usize {
    match key {
        ConfigKey::WifiSsid => SSID_OFFSET,
        ConfigKey::WifiPassword => PASSWORD_OFFSET,
    }
}

const _: () = assert!(PASSWORD_OFFSET - SSID_OFFSET == ConfigKey::WifiSsid.max_len());
const _: () = assert!(CHECKSUM_OFFSET - PASSWORD_OFFSET == ConfigKey::WifiPassword.max_len());
const _: () = assert!(CONFIG_VALUE_BYTES >= ConfigKey::WifiPassword.max_len());

pub fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C9DC5u32;
    for b in bytes {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}
