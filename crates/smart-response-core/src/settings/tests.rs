use super::*;

#[test]
fn config_keys_use_persisted_names() {
    assert_eq!(ConfigKey::WifiSsid.as_str(), "wifi_ssid");
    assert_eq!(ConfigKey::WifiPassword.as_str(), "wifi_password");
}

#[test]
fn get_or_falls_back_to_default_for_missing_keys() {
    let store = MemoryConfigStore::new();
    assert_eq!(store.get_or(ConfigKey::WifiSsid, "none"), "none");

    let store = store.with_entry(ConfigKey::WifiSsid, "home");
    assert_eq!(store.get_or(ConfigKey::WifiSsid, "none"), "home");
    assert_eq!(store.save_count(), 0);
}

#[test]
fn empty_stored_ssid_yields_no_credentials() {
    let store = MemoryConfigStore::new()
        .with_entry(ConfigKey::WifiSsid, "")
        .with_entry(ConfigKey::WifiPassword, "secret");
    assert!(load_credentials(&store).is_none());
}

#[test]
fn store_credentials_writes_both_keys_in_one_save() {
    let mut store = MemoryConfigStore::new();
    let credentials = NetworkCredentials::new("lab", "hunter22").unwrap();

    store_credentials(&mut store, &credentials).unwrap();

    assert_eq!(store.get(ConfigKey::WifiSsid), Some("lab"));
    assert_eq!(store.get(ConfigKey::WifiPassword), Some("hunter22"));
    assert_eq!(store.save_count(), 1);
    assert_eq!(load_credentials(&store), Some(credentials));
}

#[test]
fn failed_password_write_keeps_the_previous_pair() {
    let mut store = MemoryConfigStore::new()
        .with_entry(ConfigKey::WifiSsid, "home")
        .with_entry(ConfigKey::WifiPassword, "old-pw")
        .rejecting_key(ConfigKey::WifiPassword);
    let fallback = NetworkCredentials::new("BE3600", "19930101").unwrap();

    assert_eq!(
        store_credentials(&mut store, &fallback),
        Err(MemoryStoreError::WriteRejected)
    );

    assert_eq!(store.get(ConfigKey::WifiSsid), Some("home"));
    assert_eq!(store.get(ConfigKey::WifiPassword), Some("old-pw"));
    assert_eq!(store.save_count(), 0);
}

#[test]
fn oversized_entry_aborts_the_whole_batch() {
    let mut store = MemoryConfigStore::new();
    let long_password = "p".repeat(65);

    assert_eq!(
        store.save_all(&[
            (ConfigKey::WifiSsid, "lab"),
            (ConfigKey::WifiPassword, &long_password),
        ]),
        Err(MemoryStoreError::ValueTooLong)
    );
    assert!(store.get(ConfigKey::WifiSsid).is_none());
}

#[test]
fn oversized_values_are_rejected() {
    let mut store = MemoryConfigStore::new();
    let long_ssid = "s".repeat(33);
    assert_eq!(
        store.save(ConfigKey::WifiSsid, &long_ssid),
        Err(MemoryStoreError::ValueTooLong)
    );
    assert!(store.get(ConfigKey::WifiSsid).is_none());
}

#[test]
fn rejecting_store_reports_write_failure() {
    let mut store = MemoryConfigStore::new().rejecting_writes();
    assert_eq!(
        store.save(ConfigKey::WifiSsid, "x"),
        Err(MemoryStoreError::WriteRejected)
    );
}

#[test]
fn record_survives_encode_decode() {
    let mut record = ConfigRecord::empty();
    record.set(ConfigKey::WifiSsid, "BE3600").unwrap();
    record.set(ConfigKey::WifiPassword, "").unwrap();

    let decoded = ConfigRecord::decode(&record.encode()).unwrap().unwrap();
    assert_eq!(decoded, record);
    assert_eq!(decoded.get(ConfigKey::WifiPassword), Some(""));
}

#[test]
fn erased_or_foreign_flash_reads_as_empty() {
    assert_eq!(ConfigRecord::decode(&[0xFF; CONFIG_RECORD_LEN]), Ok(None));
    assert_eq!(ConfigRecord::decode(&[0x00; CONFIG_RECORD_LEN]), Ok(None));
}

#[test]
fn flipped_byte_is_reported_as_corruption() {
    let mut record = ConfigRecord::empty();
    record.set(ConfigKey::WifiSsid, "office").unwrap();
    let mut buf = record.encode();
    buf[9] ^= 0x20;

    assert_eq!(ConfigRecord::decode(&buf), Err(RecordError::Corrupted));
}

#[test]
fn checksum_matches_fnv1a_reference() {
    assert_eq!(checksum32(b""), 0x811C9DC5);
    assert_eq!(checksum32(b"a"), 0xE40C292C);
}
