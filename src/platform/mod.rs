//! Platform collaborators the capability engine queries.
//!
//! Every method is fallible: the platform camera stack is known to throw or
//! return half-populated tables on real devices, and the engine recovers from
//! each failure locally.

pub mod profile;

use crate::errors::Result;
use crate::types::{DeviceCharacteristics, LegacyProfile, PhysicalDeviceId, QualityTier};

pub use profile::{DeviceProfile, FailureInjection, ProfilePlatform, ProfiledDevice};

/// Direct camera-characteristics API.
pub trait HardwareQuery: Send + Sync {
    fn list_device_ids(&self) -> Result<Vec<PhysicalDeviceId>>;

    fn characteristics_of(&self, id: &PhysicalDeviceId) -> Result<DeviceCharacteristics>;

    /// Manufacturer string, used to look up vendor quirks.
    fn manufacturer(&self) -> Result<String>;
}

/// Legacy per-quality recording profile table.
pub trait LegacyQualityTable: Send + Sync {
    fn has_quality(&self, id: &PhysicalDeviceId, tier: QualityTier) -> Result<bool>;

    fn profile_for(&self, id: &PhysicalDeviceId, tier: QualityTier)
        -> Result<Option<LegacyProfile>>;
}

/// Encoder availability probe.
pub trait EncoderCapability: Send + Sync {
    fn is_encoder_available(&self, mime_type: &str) -> Result<bool>;
}

/// Look up one legacy profile, treating any failure as "no profile".
pub fn legacy_profile<T: LegacyQualityTable + ?Sized>(
    table: &T,
    id: &PhysicalDeviceId,
    tier: QualityTier,
) -> Option<LegacyProfile> {
    match table.has_quality(id, tier) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            log::warn!("Legacy quality check {:?} failed for camera {}: {}", tier, id, e);
            return None;
        }
    }

    match table.profile_for(id, tier) {
        Ok(profile) => profile,
        Err(e) => {
            log::warn!("Legacy profile {:?} unavailable for camera {}: {}", tier, id, e);
            None
        }
    }
}
