use sensorlab_core::{shared, EventBus};
use sensorlab_settings::{
    SettingKey, SettingValue, SettingsController, SettingsManager, SettingsStore, Snapshot,
};
use std::sync::Arc;

#[test]
fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    {
        let mut store = SettingsStore::open(&path).unwrap();
        store.set(SettingKey::Rate, SettingValue::Integer(25)).unwrap();
        store.set_str("heater/profile", "Samio").unwrap();
        store.set_str("log/path", "/data/runs").unwrap();
    }

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[acq]"));
    assert!(content.contains("rate = \"25\""));

    let store = SettingsStore::open(&path).unwrap();
    let config = store.all().config();
    assert_eq!(config.acq.rate_hz, 25);
    assert_eq!(config.heater.profile.label(), "Samio");
    assert_eq!(config.log.path, std::path::PathBuf::from("/data/runs"));
    assert_eq!(store.get(SettingKey::Buffer), SettingValue::Integer(300));
}

#[test]
fn test_hand_edited_file_degrades_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        "[acq]\nrate = \"0\"\nts = \"ISO8601\"\n\n[device]\nbaud = \"1200\"\n",
    )
    .unwrap();

    let store = SettingsStore::open(&path).unwrap();
    let snapshot = store.all();
    assert_eq!(snapshot.integer(SettingKey::Rate), 10);
    assert_eq!(snapshot.choice(SettingKey::Baud), "115200");
    assert_eq!(snapshot.choice(SettingKey::TimestampFormat), "ISO 8601");
}

#[test]
fn test_bare_number_keeps_rest_of_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        "[ui]\ntheme = \"Light\"\n\n[acq]\nrate = 25\nbuffer = 9000\n",
    )
    .unwrap();

    let mut store = SettingsStore::open(&path).unwrap();
    assert_eq!(store.get(SettingKey::Theme), SettingValue::from("Light"));
    assert_eq!(store.get(SettingKey::Rate), SettingValue::Integer(25));
    assert_eq!(store.get(SettingKey::Buffer), SettingValue::Integer(300));

    store.set(SettingKey::Crc, SettingValue::Boolean(true)).unwrap();

    let reopened = SettingsStore::open(&path).unwrap();
    assert_eq!(reopened.get(SettingKey::Theme), SettingValue::from("Light"));
    assert_eq!(reopened.get(SettingKey::Rate), SettingValue::Integer(25));
    assert_eq!(reopened.get(SettingKey::Crc), SettingValue::Boolean(true));
}

#[test]
fn test_corrupt_file_reads_as_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ \"acq\": [").unwrap();

    let store = SettingsStore::open(&path).unwrap();
    assert_eq!(store.all(), Snapshot::defaults());
}

#[test]
fn test_cancel_leaves_file_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let store = shared(SettingsStore::open(&path).unwrap());
    store
        .borrow_mut()
        .set(SettingKey::Channels, "8".into())
        .unwrap();
    let before = std::fs::read(&path).unwrap();
    let snapshot = store.borrow().all();

    let controller = SettingsController::new(store.clone(), Arc::new(EventBus::new()));
    let mut dialog = controller.open();
    dialog
        .set_value(SettingKey::Rate, &SettingValue::Integer(150))
        .unwrap();
    dialog
        .set_value(SettingKey::Channels, &SettingValue::from("4"))
        .unwrap();
    controller.cancel(dialog);

    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert_eq!(store.borrow().all(), snapshot);
}

#[test]
fn test_save_then_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let store = shared(SettingsStore::open(&path).unwrap());
    let controller = SettingsController::new(store, Arc::new(EventBus::new()));
    let mut dialog = controller.open();
    dialog
        .set_value(SettingKey::Theme, &SettingValue::from("Light"))
        .unwrap();
    dialog
        .set_value(SettingKey::Preheat, &SettingValue::Integer(120))
        .unwrap();
    controller.save(&mut dialog).unwrap();

    let reopened = SettingsStore::open(&path).unwrap();
    assert_eq!(reopened.get(SettingKey::Theme), SettingValue::from("Light"));
    assert_eq!(reopened.get(SettingKey::Preheat), SettingValue::Integer(120));
}

#[test]
fn test_config_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("override.toml");
    std::env::set_var("SENSORLAB_CONFIG", &path);

    assert_eq!(SettingsManager::config_file_path().unwrap(), path);
    let mut store = SettingsManager::open_store().unwrap();
    store.set(SettingKey::Crc, SettingValue::Boolean(true)).unwrap();
    assert!(path.exists());

    std::env::remove_var("SENSORLAB_CONFIG");
}
