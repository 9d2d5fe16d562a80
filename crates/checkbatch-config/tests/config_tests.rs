use checkbatch_config::{Config, ConfigError, ConfigManager, DeliveryPreference, Layout};
use tempfile::tempdir;

#[test]
fn default_config_matches_documented_delays() {
    let cfg = Config::default();

    assert_eq!(cfg.delivery_mode, DeliveryPreference::Interactive);
    assert_eq!(cfg.layout, Layout::Standard);
    assert!(cfg.auto_number);
    assert_eq!(cfg.settle_delay_ms, 350);
    assert_eq!(cfg.spool_delay_ms, 1200);
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let mut cfg = Config::default();
    cfg.set_value("delivery_mode", "silent").expect("mode");
    cfg.set_value("printer_name", "Check Printer").expect("printer");
    cfg.set_value("layout", "three-up").expect("layout");

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(loaded.printer_name.as_deref(), Some("Check Printer"));
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "delivery_mode": "PDF", "layout": "mystery" }"#).unwrap();
    let manager = ConfigManager::new(path, dir.path().join("backups"));

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded.delivery_mode, DeliveryPreference::Pdf);
    assert_eq!(loaded.layout, Layout::Standard);
    assert_eq!(loaded.spool_delay_ms, 1200);
}

#[test]
fn set_value_rejects_unknown_keys_and_bad_values() {
    let mut cfg = Config::default();
    assert!(matches!(
        cfg.set_value("theme", "dark"),
        Err(ConfigError::UnknownKey(key)) if key == "theme"
    ));
    assert!(matches!(
        cfg.set_value("settle_delay_ms", "soon"),
        Err(ConfigError::InvalidValue { .. })
    ));
    cfg.set_value("auto_number", "off").unwrap();
    assert!(!cfg.auto_number);
    cfg.set_value("export_folder", "/tmp/checks").unwrap();
    cfg.set_value("export_folder", "").unwrap();
    assert_eq!(cfg.export_folder, None);
}

#[test]
fn backups_can_be_listed_and_restored() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.set_value("spool_delay_ms", "2000").unwrap();
    let name = manager.backup(&cfg, Some("Before run")).expect("backup");
    assert!(name.starts_with("config_"));
    assert!(name.ends_with("_before-run.json"));
    assert_eq!(manager.list_backups().unwrap(), vec![name.clone()]);

    manager.save(&Config::default()).unwrap();
    let restored = manager.restore(&name).expect("restore");
    assert_eq!(restored.spool_delay_ms, 2000);
    assert_eq!(manager.load().unwrap().spool_delay_ms, 2000);

    assert!(matches!(
        manager.restore("config_missing.json"),
        Err(ConfigError::BackupNotFound(_))
    ));
}

#[test]
fn restore_only_reads_from_the_backups_folder() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    let mut cfg = Config::default();
    cfg.set_value("spool_delay_ms", "9").unwrap();
    manager.save(&cfg).unwrap();
    std::fs::write(dir.path().join("config_stray.json"), "{}").unwrap();

    for name in ["../config.json", "../../config_stray.json", "config.json"] {
        assert!(matches!(
            manager.restore(name),
            Err(ConfigError::BackupNotFound(_))
        ));
    }
    assert_eq!(manager.load().unwrap().spool_delay_ms, 9);
}
