//! Configuration management for lenscaps
//!
//! Holds the platform defaults, fallback thresholds and the vendor quirks
//! table consulted by the capability stages. Loaded from and saved to TOML.

use crate::capabilities::zoom::ZOOM_RATIO_LIMIT;
use crate::errors::CapabilityError;
use crate::types::{CodecOption, FrameSize};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub defaults: DefaultsConfig,
    pub frame_rate: FrameRateConfig,
    pub zoom: ZoomConfig,
    pub bitrate: BitrateConfig,
    #[serde(default = "default_quirks")]
    pub quirks: Vec<VendorQuirk>,
}

/// Platform-wide last-resort values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Frame rate used when nothing else is known
    pub frame_rate: u32,
    /// Resolution assumed when no resolution was ever stored [width, height]
    pub resolution: [u32; 2],
    /// Codec injected when encoder detection finds nothing
    pub codec: CodecOption,
    /// Factory-designated back camera id
    pub back_device_id: String,
    /// Factory-designated front camera id
    pub front_device_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRateConfig {
    /// Lists longer than this are collapsed to a curated subset
    pub collapse_threshold: usize,
    /// Rates above this are treated as bogus hardware reports
    pub max_reasonable: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    /// Upper zoom bound assumed when the hardware reports none
    pub default_max: f32,
    /// Start wide auxiliary lenses at 0.5x
    pub auto_wide_zoom: bool,
    /// Focal length at or below which an auxiliary lens counts as wide
    pub wide_focal_threshold_mm: f32,
    /// Hardware zoom bounds above this are clamped
    #[serde(default = "default_max_reasonable_zoom")]
    pub max_reasonable: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitrateConfig {
    pub min_custom_kbps: u32,
    pub max_custom_kbps: u32,
}

/// Data-driven vendor correction for frame-rate reporting.
///
/// When the device manufacturer contains `vendor` (case-insensitive) and any
/// source reported a rate of at least `when_any_at_least`, `force_frame_rate`
/// is added to the supported set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorQuirk {
    pub vendor: String,
    pub force_frame_rate: u32,
    pub when_any_at_least: u32,
}

impl VendorQuirk {
    pub fn matches(&self, manufacturer: &str) -> bool {
        !self.vendor.is_empty()
            && manufacturer
                .to_ascii_lowercase()
                .contains(&self.vendor.to_ascii_lowercase())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig {
                frame_rate: 30,
                resolution: [1920, 1080],
                codec: CodecOption::Hevc,
                back_device_id: "0".to_string(),
                front_device_id: "1".to_string(),
            },
            frame_rate: FrameRateConfig {
                collapse_threshold: 20,
                max_reasonable: 480,
            },
            zoom: ZoomConfig {
                default_max: 5.0,
                auto_wide_zoom: true,
                wide_focal_threshold_mm: 8.0,
                max_reasonable: default_max_reasonable_zoom(),
            },
            bitrate: BitrateConfig {
                min_custom_kbps: 1_000,
                max_custom_kbps: 200_000,
            },
            quirks: default_quirks(),
        }
    }
}

fn default_max_reasonable_zoom() -> f32 {
    100.0
}

/// Known under-reporters of 60fps support.
fn default_quirks() -> Vec<VendorQuirk> {
    vec![VendorQuirk {
        vendor: "samsung".to_string(),
        force_frame_rate: 60,
        when_any_at_least: 60,
    }]
}

impl EngineConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CapabilityError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            CapabilityError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: EngineConfig = toml::from_str(&contents).map_err(|e| {
            CapabilityError::Configuration(format!("Failed to parse config file: {}", e))
        })?;

        config.validate().map_err(CapabilityError::Configuration)?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CapabilityError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CapabilityError::Configuration(format!(
                        "Failed to create config directory: {}",
                        e
                    ))
                })?;
            }
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            CapabilityError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            CapabilityError::Configuration(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("lenscaps.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    pub fn default_resolution(&self) -> FrameSize {
        FrameSize::new(self.defaults.resolution[0], self.defaults.resolution[1])
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.defaults.frame_rate == 0 || self.defaults.frame_rate > self.frame_rate.max_reasonable
        {
            return Err(format!(
                "Default frame rate must be between 1 and {}",
                self.frame_rate.max_reasonable
            ));
        }
        if !self.default_resolution().is_plausible_video_size() {
            return Err("Invalid default resolution".to_string());
        }
        if self.defaults.back_device_id.is_empty() || self.defaults.front_device_id.is_empty() {
            return Err("Default device ids must not be empty".to_string());
        }

        if self.frame_rate.collapse_threshold == 0 {
            return Err("Frame rate collapse threshold must be positive".to_string());
        }

        if !self.zoom.default_max.is_finite() || self.zoom.default_max < 1.0 {
            return Err("Default maximum zoom must be at least 1.0".to_string());
        }
        if !self.zoom.wide_focal_threshold_mm.is_finite() || self.zoom.wide_focal_threshold_mm <= 0.0
        {
            return Err("Wide focal threshold must be positive".to_string());
        }
        if !self.zoom.max_reasonable.is_finite()
            || self.zoom.max_reasonable < self.zoom.default_max
            || self.zoom.max_reasonable > ZOOM_RATIO_LIMIT
        {
            return Err(format!(
                "Zoom ceiling must be between the default maximum and {}",
                ZOOM_RATIO_LIMIT
            ));
        }

        if self.bitrate.min_custom_kbps == 0
            || self.bitrate.min_custom_kbps > self.bitrate.max_custom_kbps
        {
            return Err("Custom bitrate range must be non-empty and start above 0".to_string());
        }

        for quirk in &self.quirks {
            if quirk.vendor.trim().is_empty() {
                return Err("Quirk vendor must not be empty".to_string());
            }
            if quirk.force_frame_rate == 0 {
                return Err(format!("Quirk for {} forces an invalid rate", quirk.vendor));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.defaults.frame_rate, 30);
        assert_eq!(config.default_resolution(), FrameSize::new(1920, 1080));
        assert_eq!(config.defaults.codec, CodecOption::Hevc);
        assert_eq!(config.quirks.len(), 1);
    }

    #[test]
    fn test_config_validation() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());

        let mut bad_rate = config.clone();
        bad_rate.defaults.frame_rate = 0;
        assert!(bad_rate.validate().is_err());

        let mut bad_bitrate = EngineConfig::default();
        bad_bitrate.bitrate.min_custom_kbps = 300_000;
        assert!(bad_bitrate.validate().is_err());

        let mut bad_zoom = EngineConfig::default();
        bad_zoom.zoom.default_max = f32::NAN;
        assert!(bad_zoom.validate().is_err());

        let mut bad_ceiling = EngineConfig::default();
        bad_ceiling.zoom.max_reasonable = 1.0e9;
        assert!(bad_ceiling.validate().is_err());
        bad_ceiling.zoom.max_reasonable = 2.0;
        assert!(bad_ceiling.validate().is_err());
    }

    #[test]
    fn test_quirk_matching() {
        let quirk = VendorQuirk {
            vendor: "samsung".to_string(),
            force_frame_rate: 60,
            when_any_at_least: 60,
        };
        assert!(quirk.matches("Samsung Electronics"));
        assert!(quirk.matches("SAMSUNG"));
        assert!(!quirk.matches("Google"));
    }

    #[test]
    fn test_config_toml_format() {
        let config = EngineConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[defaults]"));
        assert!(toml_string.contains("[frame_rate]"));
        assert!(toml_string.contains("[zoom]"));
        assert!(toml_string.contains("[bitrate]"));
        assert!(toml_string.contains("[[quirks]]"));
        assert!(toml_string.contains("codec = \"HEVC\""));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = EngineConfig::load_from_file("nonexistent_lenscaps.toml");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().defaults.frame_rate, 30);
    }
}
