use lenscaps::capabilities::FALLBACK_LENS_LABEL;
use lenscaps::platform::{DeviceProfile, ProfilePlatform, ProfiledDevice};
use lenscaps::testing;
use lenscaps::types::LensClass;
use lenscaps::{CameraRole, CapabilityEngine, EngineConfig};
use std::collections::HashSet;
use std::sync::Arc;

fn engine_for(profile: DeviceProfile) -> CapabilityEngine {
    CapabilityEngine::from_platform(Arc::new(ProfilePlatform::new(profile)), EngineConfig::default())
}

fn labels(engine: &CapabilityEngine, role: CameraRole) -> Vec<String> {
    engine
        .list_lenses(role)
        .into_iter()
        .map(|l| l.display_label)
        .collect()
}

#[test]
fn test_single_back_lens_is_labelled_by_designation_only() {
    let engine = engine_for(testing::single_back_lens());
    let lenses = engine.list_lenses(CameraRole::Back);

    assert_eq!(lenses.len(), 1);
    assert_eq!(lenses[0].id.as_str(), "0");
    assert!(lenses[0].is_default);
    assert_eq!(lenses[0].display_label, "Main");
    assert_eq!(lenses[0].focal_length_mm, Some(4.2));
    assert!(!lenses[0].display_label.contains("Wide"));
}

#[test]
fn test_triple_array_is_classified_and_deduplicated() {
    let engine = engine_for(testing::triple_back_array());
    let lenses = engine.list_lenses(CameraRole::Back);

    let ids: Vec<&str> = lenses.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["0", "2", "3"]);
    assert_eq!(
        labels(&engine, CameraRole::Back),
        vec!["Main", "Ultra-Wide (2) 2mm", "Standard (3) 18mm"]
    );
    assert_eq!(lenses[1].class, LensClass::UltraWide);
}

#[test]
fn test_front_role_only_lists_front_devices() {
    let engine = engine_for(testing::triple_back_array());
    let lenses = engine.list_lenses(CameraRole::Front);
    assert_eq!(lenses.len(), 1);
    assert_eq!(lenses[0].display_label, "Front");
    assert_eq!(lenses[0].class, LensClass::Main);
}

#[test]
fn test_secondary_front_lens_carries_its_id() {
    let engine = engine_for(DeviceProfile {
        devices: vec![
            ProfiledDevice::front("1").with_focal_length(2.7),
            ProfiledDevice::front("5").with_focal_length(2.2),
        ],
        ..DeviceProfile::default()
    });
    assert_eq!(labels(&engine, CameraRole::Front), vec!["Front", "Front (5) 2mm"]);
}

#[test]
fn test_broken_hal_still_offers_a_default_lens() {
    let engine = engine_for(testing::broken_hal());
    for role in CameraRole::ALL {
        let lenses = engine.list_lenses(role);
        assert_eq!(lenses.len(), 1);
        assert!(lenses[0].is_default);
        assert_eq!(lenses[0].display_label, FALLBACK_LENS_LABEL);
    }
}

#[test]
fn test_non_numeric_ids_sort_after_numeric() {
    let engine = engine_for(DeviceProfile {
        devices: vec![
            ProfiledDevice::back("aux-b").with_focal_length(80.0),
            ProfiledDevice::back("10").with_focal_length(55.0),
            ProfiledDevice::back("0").with_focal_length(5.0),
            ProfiledDevice::back("aux-a").with_focal_length(2.0),
        ],
        ..DeviceProfile::default()
    });
    let ids: Vec<String> = engine
        .list_lenses(CameraRole::Back)
        .into_iter()
        .map(|l| l.id.to_string())
        .collect();
    assert_eq!(ids, vec!["0", "10", "aux-a", "aux-b"]);
}

#[test]
fn test_custom_default_ids_from_config() {
    let mut config = EngineConfig::default();
    config.defaults.back_device_id = "2".to_string();
    let engine = CapabilityEngine::from_platform(
        Arc::new(ProfilePlatform::new(testing::triple_back_array())),
        config,
    );
    let lenses = engine.list_lenses(CameraRole::Back);
    assert_eq!(lenses[0].id.as_str(), "2");
    assert!(lenses[0].is_default);
    assert_eq!(lenses[0].display_label, "Main");
    assert_eq!(lenses.iter().filter(|l| l.is_default).count(), 1);
}

#[test]
fn test_labels_are_unique_for_every_fixture() {
    for profile in [
        testing::single_back_lens(),
        testing::triple_back_array(),
        testing::samsung_underreporter(),
        testing::broken_hal(),
        testing::legacy_only_device(),
    ] {
        let engine = engine_for(profile);
        for role in CameraRole::ALL {
            let labels = labels(&engine, role);
            let unique: HashSet<&String> = labels.iter().collect();
            assert_eq!(unique.len(), labels.len(), "duplicate labels: {:?}", labels);
        }
    }
}
