//! lenscaps: camera hardware capability resolution for video recording settings
//!
//! Discovers what a phone's cameras can actually record (lenses, resolutions,
//! frame rates, zoom steps, codecs), reconciles that with the user's saved
//! selections and produces a picker-ready option set plus an effective
//! configuration that is guaranteed to be valid for the hardware.
//!
//! # Features
//! - Lens enumeration with focal-length classification for multi-lens arrays
//! - Curated, area-ordered resolution lists with legacy-table fallback
//! - Frame-rate discovery across AE ranges, high-speed modes and legacy profiles
//! - Data-driven vendor quirks
//! - Self-healing of stale preferences with batched write-back
//!
//! # Usage
//! ```rust,ignore
//! use lenscaps::{CameraRole, CapabilityEngine, EngineConfig, MemoryPreferences, ProfilePlatform};
//! use std::sync::Arc;
//!
//! let platform = Arc::new(ProfilePlatform::from_json_file("pixel8.json")?);
//! let engine = CapabilityEngine::from_platform(platform, EngineConfig::load_or_default());
//! let mut prefs = MemoryPreferences::new();
//! let config = engine.resolve(CameraRole::Back, &mut prefs);
//! println!("{} @ {} fps", config.resolution, config.frame_rate);
//! ```
pub mod capabilities;
pub mod config;
pub mod engine;
pub mod errors;
pub mod invariant_ppt;
pub mod platform;
pub mod preferences;
pub mod session;
pub mod types;

// Testing utilities - device profiles for offline testing
pub mod testing;

// Re-exports for convenience
pub use config::{EngineConfig, VendorQuirk};
pub use engine::{CapabilityCache, CapabilityEngine, Correction, LensCapabilities, ResolveOutcome};
pub use errors::CapabilityError;
pub use platform::{EncoderCapability, HardwareQuery, LegacyQualityTable, ProfilePlatform};
pub use preferences::{MemoryPreferences, PrefKey, PrefValue, PreferenceStore};
pub use session::{CameraOptions, SettingsSession};
pub use types::{
    CameraRole, CodecOption, EffectiveConfiguration, FrameSize, LensDescriptor, PhysicalDeviceId,
    ResolutionOption,
};

/// Initialize logging for the capability engine
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "lenscaps=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_info() {
        let info = get_info();
        assert_eq!(info.name, "lenscaps");
        assert!(!info.version.is_empty());
        assert!(!info.description.is_empty());
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        init_logging();
        init_logging();
        assert!(std::env::var("RUST_LOG").is_ok());
    }
}
