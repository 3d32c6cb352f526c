use lenscaps::config::{EngineConfig, VendorQuirk};
use lenscaps::errors::CapabilityError;
use lenscaps::platform::ProfilePlatform;
use lenscaps::testing;
use lenscaps::{CapabilityEngine, CodecOption, PhysicalDeviceId};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("lenscaps.toml");

    let mut config = EngineConfig::default();
    config.defaults.frame_rate = 25;
    config.defaults.codec = CodecOption::Avc;
    config.zoom.auto_wide_zoom = false;
    config.quirks.push(VendorQuirk {
        vendor: "xiaomi".to_string(),
        force_frame_rate: 120,
        when_any_at_least: 240,
    });

    config.save_to_file(&path).unwrap();
    let loaded = EngineConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_quirks_table_gets_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lenscaps.toml");

    let mut toml_text = toml::to_string_pretty(&EngineConfig::default()).unwrap();
    let cut = toml_text.find("[[quirks]]").unwrap();
    toml_text.truncate(cut);
    fs::write(&path, toml_text).unwrap();

    let loaded = EngineConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.quirks, EngineConfig::default().quirks);
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lenscaps.toml");

    let mut config = EngineConfig::default();
    config.defaults.resolution = [100, 100];
    fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

    let err = EngineConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, CapabilityError::Configuration(_)));
    assert!(err.to_string().contains("Invalid default resolution"));
}

#[test]
fn test_malformed_toml_is_configuration_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lenscaps.toml");
    fs::write(&path, "[defaults\nframe_rate = ").unwrap();

    let err = EngineConfig::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_loaded_config_drives_the_engine() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lenscaps.toml");

    let mut config = EngineConfig::default();
    config.zoom.default_max = 2.0;
    config.quirks.clear();
    config.save_to_file(&path).unwrap();

    let loaded = EngineConfig::load_from_file(&path).unwrap();
    let engine = CapabilityEngine::from_platform(
        Arc::new(ProfilePlatform::new(testing::samsung_underreporter())),
        loaded,
    );
    assert!(!engine.supported_frame_rates(&PhysicalDeviceId::from("0")).contains(&60));

    let engine = CapabilityEngine::from_platform(
        Arc::new(ProfilePlatform::new(testing::broken_hal())),
        EngineConfig::load_from_file(&path).unwrap(),
    );
    assert_eq!(
        engine.zoom_steps(&PhysicalDeviceId::from("0")),
        vec![0.5, 1.0, 1.5, 2.0]
    );
}
