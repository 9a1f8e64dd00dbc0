use embedded_storage::{ReadStorage, Storage};
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use esp_rom_sys::rom::spiflash::{
    ESP_ROM_SPIFLASH_RESULT_OK, esp_rom_spiflash_erase_sector, esp_rom_spiflash_read,
    esp_rom_spiflash_unlock, esp_rom_spiflash_write,
};
use log::{info, warn};
use smart_response_core::settings::{
    CONFIG_RECORD_LEN, ConfigKey, ConfigRecord, ConfigStore, RecordError,
};

const FLASH_SECTOR_SIZE: u32 = 4096;
const PARTITION_TABLE_OFFSET: usize = 0x8000;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlashConfigError {
    PartitionTable,
    ConfigPartitionMissing,
    PartitionTooSmall,
    FlashOpFailed(i32),
    Corrupted,
    ValueTooLong,
    Unsupported,
}

impl From<RecordError> for FlashConfigError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::ValueTooLong => Self::ValueTooLong,
            RecordError::Corrupted => Self::Corrupted,
        }
    }
}

/// Word-aligned access to the SPI flash through the ROM routines.
#[derive(Debug)]
struct RawFlash;

impl RawFlash {
    fn new() -> Result<Self, FlashConfigError> {
        let rc = unsafe { esp_rom_spiflash_unlock() };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashConfigError::FlashOpFailed(rc));
        }
        Ok(Self)
    }

    fn erase_sector(&mut self, sector_addr: u32) -> Result<(), FlashConfigError> {
        if !sector_addr.is_multiple_of(FLASH_SECTOR_SIZE) {
            return Err(FlashConfigError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_erase_sector(sector_addr / FLASH_SECTOR_SIZE) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashConfigError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn read_word(&mut self, addr: u32) -> Result<u32, FlashConfigError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashConfigError::Unsupported);
        }

        let mut word = 0u32;
        let rc = unsafe { esp_rom_spiflash_read(addr, &mut word as *mut u32 as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashConfigError::FlashOpFailed(rc));
        }
        Ok(word)
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashConfigError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashConfigError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_write(addr, &word as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashConfigError::FlashOpFailed(rc));
        }
        Ok(())
    }

    /// `addr` may be unaligned; whole words are read and sliced.
    fn read_bytes(&mut self, addr: u32, out: &mut [u8]) -> Result<(), FlashConfigError> {
        let start = addr & !0b11;
        let end = (addr + out.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let bytes = self.read_word(word_addr)?.to_le_bytes();
            for (i, b) in bytes.iter().enumerate() {
                let Some(dst) = (word_addr + i as u32).checked_sub(addr) else {
                    continue;
                };
                if let Some(slot) = out.get_mut(dst as usize) {
                    *slot = *b;
                }
            }
        }
        Ok(())
    }

    /// Target range must be erased; bytes outside `data` are written as 0xFF.
    fn write_erased_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashConfigError> {
        let start = addr & !0b11;
        let end = (addr + data.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let mut bytes = [0xFFu8; 4];
            for (i, slot) in bytes.iter_mut().enumerate() {
                let Some(src) = (word_addr + i as u32).checked_sub(addr) else {
                    continue;
                };
                if let Some(b) = data.get(src as usize) {
                    *slot = *b;
                }
            }
            self.write_word(word_addr, u32::from_le_bytes(bytes))?;
        }
        Ok(())
    }
}

impl ReadStorage for RawFlash {
    type Error = FlashConfigError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_bytes(offset, bytes)
    }

    // Only the partition table is read through `ReadStorage`.
    fn capacity(&self) -> usize {
        PARTITION_TABLE_OFFSET + PARTITION_TABLE_MAX_LEN
    }
}

impl Storage for RawFlash {
    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        Err(FlashConfigError::Unsupported)
    }
}

/// Config record kept in the last sector of a writable data partition.
///
/// Values are cached in RAM after `load`; `save` rewrites the whole sector.
#[derive(Debug)]
pub struct FlashConfigStore {
    flash: RawFlash,
    record_addr: u32,
    cache: ConfigRecord,
}

impl FlashConfigStore {
    pub fn new() -> Result<Self, FlashConfigError> {
        let mut flash = RawFlash::new()?;

        let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
        let table = read_partition_table(&mut flash, &mut table_buf)
            .map_err(|_| FlashConfigError::PartitionTable)?;

        let mut data_undefined: Option<(u32, u32)> = None;
        let mut fallback_nvs: Option<(u32, u32)> = None;

        for entry in table.iter() {
            if entry.is_read_only() || entry.len() < FLASH_SECTOR_SIZE {
                continue;
            }

            match entry.partition_type() {
                PartitionType::Data(DataPartitionSubType::Undefined) => {
                    data_undefined = Some((entry.offset(), entry.len()));
                    break;
                }
                PartitionType::Data(DataPartitionSubType::Nvs) => {
                    if fallback_nvs.is_none() {
                        fallback_nvs = Some((entry.offset(), entry.len()));
                    }
                }
                _ => {}
            }
        }

        let (offset, len) = data_undefined
            .or(fallback_nvs)
            .ok_or(FlashConfigError::ConfigPartitionMissing)?;

        if len < FLASH_SECTOR_SIZE {
            return Err(FlashConfigError::PartitionTooSmall);
        }

        let record_addr = offset + len - FLASH_SECTOR_SIZE;
        info!("config: flash record at 0x{:08x}", record_addr);
        Ok(Self {
            flash,
            record_addr,
            cache: ConfigRecord::empty(),
        })
    }

    fn write_record(&mut self, record: &ConfigRecord) -> Result<(), FlashConfigError> {
        let buf = record.encode();
        self.flash.erase_sector(self.record_addr)?;
        self.flash.write_erased_bytes(self.record_addr, &buf)
    }
}

impl ConfigStore for FlashConfigStore {
    type Error = FlashConfigError;

    fn load(&mut self) -> Result<(), Self::Error> {
        let mut buf = [0u8; CONFIG_RECORD_LEN];
        self.flash.read_bytes(self.record_addr, &mut buf)?;

        match ConfigRecord::decode(&buf) {
            Ok(Some(record)) => {
                self.cache = record;
                Ok(())
            }
            Ok(None) => {
                info!("config: no stored record");
                self.cache = ConfigRecord::empty();
                Ok(())
            }
            Err(err) => {
                warn!("config: stored record rejected: {:?}", err);
                self.cache = ConfigRecord::empty();
                Err(err.into())
            }
        }
    }

    fn get(&self, key: ConfigKey) -> Option<&str> {
        self.cache.get(key)
    }

    fn save_all(&mut self, entries: &[(ConfigKey, &str)]) -> Result<(), Self::Error> {
        let mut next = self.cache.clone();
        for (key, value) in entries {
            next.set(*key, value)?;
        }
        self.write_record(&next)?;
        self.cache = next;
        Ok(())
    }
}
