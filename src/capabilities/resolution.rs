//! Resolution curation
//!
//! Turns the raw size catalog of a lens into a short, area-ordered picker
//! list. Each step is a small function over the candidate list so the
//! fallback chain can be tested stage by stage:
//!
//! 1. canonical ladder matches
//! 2. device-specific high-resolution extras
//! 3. the persisted size, when the hardware supports it
//! 4. area-descending sort with duplicates removed
//! 5. legacy table, then the persisted size, when everything else is empty

use crate::assert_invariant;
use crate::errors::CapabilityError;
use crate::platform::{legacy_profile, LegacyQualityTable};
use crate::types::{FrameSize, PhysicalDeviceId, QualityTier, ResolutionOption};
use serde::{Deserialize, Serialize};

/// Known-good recording sizes, highest first.
pub const CANONICAL_LADDER: [FrameSize; 12] = [
    FrameSize::new(7680, 4320),
    FrameSize::new(3840, 2160),
    FrameSize::new(2560, 1440),
    FrameSize::new(1920, 1080),
    FrameSize::new(1280, 720),
    FrameSize::new(854, 480),
    FrameSize::new(720, 480),
    FrameSize::new(640, 480),
    FrameSize::new(480, 360),
    FrameSize::new(426, 240),
    FrameSize::new(352, 288),
    FrameSize::new(320, 240),
];

/// Legacy tiers consulted when the hardware reports no sizes at all.
pub const LEGACY_FALLBACK_TIERS: [QualityTier; 10] = [
    QualityTier::Uhd8k,
    QualityTier::P2160,
    QualityTier::Qhd2k,
    QualityTier::P1080,
    QualityTier::P720,
    QualityTier::P480,
    QualityTier::Cif,
    QualityTier::Qcif,
    QualityTier::Low,
    QualityTier::High,
];

/// Non-canonical sizes at or above this area are kept as device extras.
pub const HIGH_RESOLUTION_FLOOR: u64 = 1920 * 1080;

/// Result of curating one lens against the persisted resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedResolutions {
    pub options: Vec<ResolutionOption>,
    /// Size the configuration should use.
    pub selected: FrameSize,
    /// Set when the persisted size had to be replaced.
    pub correction: Option<FrameSize>,
}

impl CuratedResolutions {
    pub fn sizes(&self) -> Vec<FrameSize> {
        self.options.iter().map(|o| o.size).collect()
    }

    pub fn contains(&self, size: FrameSize) -> bool {
        self.options.iter().any(|o| o.size == size)
    }
}

/// Human-readable quality name for well-known sizes.
pub fn quality_name(size: FrameSize) -> Option<&'static str> {
    let name = match (size.width, size.height) {
        (7680, 4320) => "8K UHD",
        (3840, 2160) => "4K UHD",
        (2560, 1440) => "2K QHD",
        (1920, 1080) => "Full HD",
        (1280, 720) => "HD",
        (854, 480) => "480p",
        (720, 480) => "SD",
        (640, 480) => "SD (4:3)",
        (480, 360) => "360p",
        (426, 240) => "240p",
        (352, 288) => "CIF",
        (320, 240) => "QVGA",
        _ => return None,
    };
    Some(name)
}

pub fn resolution_label(size: FrameSize) -> String {
    match quality_name(size) {
        Some(name) => format!("{} ({})", name, size),
        None => size.to_string(),
    }
}

/// Sizes from the legacy quality table, deduplicated and largest first.
pub fn legacy_sizes<T: LegacyQualityTable + ?Sized>(
    table: &T,
    device: &PhysicalDeviceId,
) -> Vec<FrameSize> {
    let sizes: Vec<FrameSize> = LEGACY_FALLBACK_TIERS
        .iter()
        .filter_map(|&tier| legacy_profile(table, device, tier))
        .map(|profile| profile.size())
        .filter(|size| size.width > 0 && size.height > 0)
        .collect();
    sort_by_area_desc(sizes)
}

/// Canonical ladder entries the hardware advertises.
pub fn canonical_matches(supported: &[FrameSize]) -> Vec<FrameSize> {
    CANONICAL_LADDER
        .iter()
        .copied()
        .filter(|size| supported.contains(size))
        .collect()
}

/// Add supported sizes of at least Full HD area missing from the ladder.
pub fn with_high_resolution_extras(mut curated: Vec<FrameSize>, supported: &[FrameSize]) -> Vec<FrameSize> {
    for size in supported {
        if size.area() >= HIGH_RESOLUTION_FLOOR && !curated.contains(size) {
            curated.push(*size);
        }
    }
    curated
}

/// Keep a non-canonical persisted size visible as long as the hardware supports it.
pub fn with_persisted(
    mut curated: Vec<FrameSize>,
    supported: &[FrameSize],
    persisted: FrameSize,
) -> Vec<FrameSize> {
    if supported.contains(&persisted) && !curated.contains(&persisted) {
        curated.insert(0, persisted);
    }
    curated
}

/// Area descending, wider first on ties, duplicates removed.
pub fn sort_by_area_desc(mut sizes: Vec<FrameSize>) -> Vec<FrameSize> {
    sizes.sort_by(|a, b| b.area().cmp(&a.area()).then(b.width.cmp(&a.width)));
    sizes.dedup();
    sizes
}

/// Curate `raw` sizes for a picker and reconcile `persisted` against them.
///
/// `legacy` is only evaluated when the raw catalog is empty or nothing
/// survives curation.
pub fn curate<F>(raw: &[FrameSize], legacy: F, persisted: FrameSize) -> CuratedResolutions
where
    F: FnOnce() -> Vec<FrameSize>,
{
    let mut legacy = Some(legacy);
    let mut legacy_cache: Option<Vec<FrameSize>> = None;
    let mut fetch_legacy = || {
        legacy_cache
            .get_or_insert_with(|| legacy.take().map_or_else(Vec::new, |f| f()))
            .clone()
    };

    let supported: Vec<FrameSize> = if raw.is_empty() {
        let fallback = fetch_legacy();
        log::warn!(
            "No hardware frame sizes, using {} legacy quality sizes",
            fallback.len()
        );
        fallback
    } else {
        raw.to_vec()
    };

    let curated = canonical_matches(&supported);
    let curated = with_high_resolution_extras(curated, &supported);
    let curated = with_persisted(curated, &supported, persisted);
    let mut curated = sort_by_area_desc(curated);

    if curated.is_empty() {
        curated = fetch_legacy();
        if curated.is_empty() {
            let err = CapabilityError::EmptyCapabilitySet(format!(
                "no resolutions from any source, keeping {}",
                persisted
            ));
            log::warn!("{}", err);
            curated = vec![persisted];
        } else {
            log::warn!("Curation produced nothing, using legacy quality sizes verbatim");
        }
    }

    let (selected, correction) = if curated.contains(&persisted) {
        (persisted, None)
    } else {
        let replacement = curated[0];
        log::info!(
            "Persisted resolution {} is not supported, switching to {}",
            persisted,
            replacement
        );
        (replacement, Some(replacement))
    };

    assert_invariant!(
        curated.windows(2).all(|w| w[0].area() >= w[1].area()),
        "Resolutions are sorted by descending area",
        "resolution"
    );
    assert_invariant!(
        curated
            .iter()
            .enumerate()
            .all(|(i, s)| !curated[i + 1..].contains(s)),
        "Resolutions contain no duplicate sizes",
        "resolution"
    );
    assert_invariant!(
        !supported.contains(&persisted) || curated.contains(&persisted),
        "Supported persisted resolution is always offered",
        "resolution"
    );

    let options = curated
        .into_iter()
        .map(|size| ResolutionOption {
            size,
            label: resolution_label(size),
        })
        .collect();

    CuratedResolutions {
        options,
        selected,
        correction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UHD: FrameSize = FrameSize::new(3840, 2160);
    const FHD: FrameSize = FrameSize::new(1920, 1080);
    const HD: FrameSize = FrameSize::new(1280, 720);

    #[test]
    fn test_labels() {
        assert_eq!(resolution_label(UHD), "4K UHD (3840x2160)");
        assert_eq!(resolution_label(FrameSize::new(640, 480)), "SD (4:3) (640x480)");
        assert_eq!(resolution_label(FrameSize::new(4000, 3000)), "4000x3000");
    }

    #[test]
    fn test_stale_persisted_size_is_corrected() {
        let raw = [UHD, FHD, HD];
        let curated = curate(&raw, Vec::new, FrameSize::new(3264, 2448));
        assert_eq!(curated.sizes(), vec![UHD, FHD, HD]);
        assert_eq!(curated.selected, UHD);
        assert_eq!(curated.correction, Some(UHD));
    }

    #[test]
    fn test_valid_persisted_size_needs_no_correction() {
        let curated = curate(&[HD, FHD], Vec::new, HD);
        assert_eq!(curated.sizes(), vec![FHD, HD]);
        assert_eq!(curated.selected, HD);
        assert!(curated.correction.is_none());
    }

    #[test]
    fn test_non_canonical_sizes() {
        let odd_small = FrameSize::new(1440, 1080);
        let big = FrameSize::new(4000, 3000);
        let small_extra = FrameSize::new(1024, 768);

        let curated = curate(&[big, FHD, odd_small, small_extra], Vec::new, FHD);
        // Large extras stay, small non-canonical ones are dropped.
        assert_eq!(curated.sizes(), vec![big, FHD]);

        let curated = curate(&[big, FHD, odd_small], Vec::new, odd_small);
        assert_eq!(curated.sizes(), vec![big, FHD, odd_small]);
        assert_eq!(curated.selected, odd_small);
    }

    #[test]
    fn test_legacy_fallback_when_raw_is_empty() {
        let curated = curate(&[], || vec![FHD, HD, FrameSize::new(176, 144)], HD);
        assert_eq!(curated.sizes(), vec![FHD, HD]);
        assert_eq!(curated.selected, HD);
    }

    #[test]
    fn test_legacy_verbatim_when_curation_is_empty() {
        let odd = FrameSize::new(1024, 768);
        let qcif = FrameSize::new(176, 144);
        let curated = curate(&[odd], || vec![qcif], FHD);
        assert_eq!(curated.sizes(), vec![qcif]);
        assert_eq!(curated.correction, Some(qcif));
    }

    #[test]
    fn test_last_resort_is_persisted_size() {
        let curated = curate(&[], Vec::new, FHD);
        assert_eq!(curated.sizes(), vec![FHD]);
        assert_eq!(curated.selected, FHD);
        assert!(curated.correction.is_none());
    }

    #[test]
    fn test_legacy_is_not_queried_when_hardware_answers() {
        let curated = curate(&[FHD], || panic!("legacy table queried"), FHD);
        assert_eq!(curated.sizes(), vec![FHD]);
    }

    #[test]
    fn test_sort_dedups_and_breaks_ties_by_width() {
        let square = FrameSize::new(1440, 1440);
        let tall = FrameSize::new(1920, 1080);
        let sorted = sort_by_area_desc(vec![HD, tall, square, HD]);
        assert_eq!(sorted, vec![tall, square, HD]);
    }
}
