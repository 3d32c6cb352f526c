//! Data-driven platform backed by a captured capability dump.
//!
//! A [`DeviceProfile`] is a JSON snapshot of what a phone's camera stack
//! reported: devices, characteristics, legacy profiles and encoder support.
//! [`ProfilePlatform`] replays it through the collaborator traits, which is
//! how the CLI inspects a device offline and how the test fixtures are built.

use crate::errors::{CapabilityError, Result};
use crate::platform::{EncoderCapability, HardwareQuery, LegacyQualityTable};
use crate::types::{
    DeviceCharacteristics, FpsRange, FrameSize, LegacyProfile, LensFacing, PhysicalDeviceId,
    QualityTier, ZoomRange,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub manufacturer: String,
    pub model: String,
    pub devices: Vec<ProfiledDevice>,
    /// Encoder mime types that can be instantiated.
    pub encoders: Vec<String>,
    pub failures: FailureInjection,
}

/// Switches that make whole-platform queries throw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureInjection {
    pub list_devices: bool,
    pub manufacturer: bool,
    pub encoders: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfiledDevice {
    pub id: PhysicalDeviceId,
    #[serde(flatten)]
    pub characteristics: DeviceCharacteristics,
    #[serde(default)]
    pub legacy_profiles: BTreeMap<QualityTier, LegacyProfile>,
    /// Characteristics query throws for this device.
    #[serde(default)]
    pub fail_characteristics: bool,
    /// Legacy table lookups throw for this device.
    #[serde(default)]
    pub fail_legacy: bool,
}

impl ProfiledDevice {
    pub fn new(id: impl Into<String>, facing: LensFacing) -> Self {
        Self {
            id: PhysicalDeviceId::new(id),
            characteristics: DeviceCharacteristics {
                facing: Some(facing),
                ..DeviceCharacteristics::default()
            },
            legacy_profiles: BTreeMap::new(),
            fail_characteristics: false,
            fail_legacy: false,
        }
    }

    pub fn back(id: impl Into<String>) -> Self {
        Self::new(id, LensFacing::Back)
    }

    pub fn front(id: impl Into<String>) -> Self {
        Self::new(id, LensFacing::Front)
    }

    pub fn with_focal_length(mut self, focal_mm: f32) -> Self {
        self.characteristics.focal_lengths_mm = vec![focal_mm];
        self
    }

    pub fn with_sizes(mut self, sizes: &[(u32, u32)]) -> Self {
        self.characteristics.output_sizes =
            Some(sizes.iter().map(|&(w, h)| FrameSize::new(w, h)).collect());
        self
    }

    pub fn with_fps_ranges(mut self, ranges: &[(u32, u32)]) -> Self {
        self.characteristics.fps_ranges =
            ranges.iter().map(|&(lo, hi)| FpsRange::new(lo, hi)).collect();
        self
    }

    pub fn with_high_speed_ranges(mut self, ranges: &[(u32, u32)]) -> Self {
        self.characteristics.high_speed_fps_ranges =
            ranges.iter().map(|&(lo, hi)| FpsRange::new(lo, hi)).collect();
        self
    }

    pub fn with_zoom_max(mut self, max: f32) -> Self {
        self.characteristics.zoom_ratio_range = Some(ZoomRange {
            min: ZoomRange::DEFAULT_MIN,
            max,
        });
        self
    }

    pub fn with_legacy(mut self, tier: QualityTier, width: u32, height: u32, fps: u32) -> Self {
        self.legacy_profiles.insert(
            tier,
            LegacyProfile {
                width,
                height,
                frame_rate: fps,
                bitrate: 0,
            },
        );
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_characteristics = true;
        self
    }

    pub fn failing_legacy(mut self) -> Self {
        self.fail_legacy = true;
        self
    }
}

/// Replays a [`DeviceProfile`] through the platform traits.
#[derive(Debug, Default)]
pub struct ProfilePlatform {
    profile: DeviceProfile,
    encoder_probes: AtomicUsize,
}

impl ProfilePlatform {
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            encoder_probes: AtomicUsize::new(0),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let profile: DeviceProfile = serde_json::from_str(json).map_err(|e| {
            CapabilityError::Configuration(format!("Failed to parse device profile: {}", e))
        })?;
        Ok(Self::new(profile))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            CapabilityError::Io(format!("Failed to read device profile {:?}: {}", path, e))
        })?;
        let platform = Self::from_json_str(&contents)?;
        log::info!(
            "Loaded device profile {:?}: {} {} with {} cameras",
            path,
            platform.profile.manufacturer,
            platform.profile.model,
            platform.profile.devices.len()
        );
        Ok(platform)
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Number of encoder probes served so far.
    pub fn encoder_probe_count(&self) -> usize {
        self.encoder_probes.load(Ordering::Relaxed)
    }

    fn device(&self, id: &PhysicalDeviceId) -> Result<&ProfiledDevice> {
        self.profile
            .devices
            .iter()
            .find(|d| &d.id == id)
            .ok_or_else(|| CapabilityError::HardwareQuery(format!("unknown camera id {}", id)))
    }
}

impl HardwareQuery for ProfilePlatform {
    fn list_device_ids(&self) -> Result<Vec<PhysicalDeviceId>> {
        if self.profile.failures.list_devices {
            return Err(CapabilityError::HardwareQuery(
                "camera service unavailable".to_string(),
            ));
        }
        Ok(self.profile.devices.iter().map(|d| d.id.clone()).collect())
    }

    fn characteristics_of(&self, id: &PhysicalDeviceId) -> Result<DeviceCharacteristics> {
        let device = self.device(id)?;
        if device.fail_characteristics {
            return Err(CapabilityError::HardwareQuery(format!(
                "characteristics query failed for camera {}",
                id
            )));
        }
        Ok(device.characteristics.clone())
    }

    fn manufacturer(&self) -> Result<String> {
        if self.profile.failures.manufacturer {
            return Err(CapabilityError::HardwareQuery(
                "build properties unavailable".to_string(),
            ));
        }
        Ok(self.profile.manufacturer.clone())
    }
}

impl LegacyQualityTable for ProfilePlatform {
    fn has_quality(&self, id: &PhysicalDeviceId, tier: QualityTier) -> Result<bool> {
        let device = self.device(id)?;
        if device.fail_legacy {
            return Err(CapabilityError::HardwareQuery(format!(
                "profile table unavailable for camera {}",
                id
            )));
        }
        Ok(device.legacy_profiles.contains_key(&tier))
    }

    fn profile_for(
        &self,
        id: &PhysicalDeviceId,
        tier: QualityTier,
    ) -> Result<Option<LegacyProfile>> {
        let device = self.device(id)?;
        if device.fail_legacy {
            return Err(CapabilityError::HardwareQuery(format!(
                "profile table unavailable for camera {}",
                id
            )));
        }
        Ok(device.legacy_profiles.get(&tier).copied())
    }
}

impl EncoderCapability for ProfilePlatform {
    fn is_encoder_available(&self, mime_type: &str) -> Result<bool> {
        self.encoder_probes.fetch_add(1, Ordering::Relaxed);
        if self.profile.failures.encoders {
            return Err(CapabilityError::HardwareQuery(
                "codec list unavailable".to_string(),
            ));
        }
        Ok(self
            .profile
            .encoders
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mime_type)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_JSON: &str = r#"{
        "manufacturer": "Google",
        "model": "Pixel 7",
        "encoders": ["video/avc"],
        "devices": [
            {
                "id": "0",
                "facing": "back",
                "focal_lengths_mm": [6.8],
                "output_sizes": [{"width": 1920, "height": 1080}],
                "fps_ranges": [{"min": 15, "max": 30}],
                "zoom_ratio_range": {"min": 1.0, "max": 10.0},
                "legacy_profiles": {
                    "1080p": {"width": 1920, "height": 1080, "frame_rate": 30, "bitrate": 12000000}
                }
            },
            {"id": "1", "facing": "front", "fail_characteristics": true}
        ]
    }"#;

    #[test]
    fn test_profile_json_parses() {
        let platform = ProfilePlatform::from_json_str(PROFILE_JSON).unwrap();
        assert_eq!(platform.profile().devices.len(), 2);
        assert_eq!(platform.manufacturer().unwrap(), "Google");

        let back = platform
            .characteristics_of(&PhysicalDeviceId::from("0"))
            .unwrap();
        assert_eq!(back.facing, Some(LensFacing::Back));
        assert_eq!(back.primary_focal_length(), Some(6.8));
        assert_eq!(back.fps_ranges, vec![FpsRange::new(15, 30)]);
        assert!(platform
            .has_quality(&PhysicalDeviceId::from("0"), QualityTier::P1080)
            .unwrap());
    }

    #[test]
    fn test_failure_injection() {
        let platform = ProfilePlatform::from_json_str(PROFILE_JSON).unwrap();
        assert!(platform
            .characteristics_of(&PhysicalDeviceId::from("1"))
            .is_err());
        assert!(platform
            .characteristics_of(&PhysicalDeviceId::from("9"))
            .is_err());
    }

    #[test]
    fn test_encoder_probe_counting() {
        let platform = ProfilePlatform::from_json_str(PROFILE_JSON).unwrap();
        assert!(platform.is_encoder_available("VIDEO/AVC").unwrap());
        assert!(!platform.is_encoder_available("video/hevc").unwrap());
        assert_eq!(platform.encoder_probe_count(), 2);
    }

    #[test]
    fn test_malformed_profile_is_configuration_error() {
        let err = ProfilePlatform::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, CapabilityError::Configuration(_)));
    }
}
