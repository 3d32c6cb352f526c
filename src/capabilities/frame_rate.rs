//! Frame rate resolution
//!
//! The auto-exposure range API is the primary source, but many devices
//! under-report what the recorder can actually do. The pipeline is:
//!
//! 1. every integer inside each AE range, plus high-speed range ceilings
//! 2. legacy profile augmentation (or synthesis when step 1 is empty)
//! 3. vendor quirks from the configuration table
//! 4. collapse of oversized lists to a picker-friendly subset
//! 5. the platform default rate as the last resort

use crate::assert_invariant;
use crate::config::{EngineConfig, VendorQuirk};
use crate::errors::CapabilityError;
use crate::platform::{legacy_profile, HardwareQuery, LegacyQualityTable};
use crate::types::{DeviceCharacteristics, PhysicalDeviceId, QualityTier};
use std::collections::BTreeSet;

/// Legacy tiers whose recording profiles hint at the real frame-rate ceiling.
pub const LEGACY_RATE_TIERS: [QualityTier; 7] = [
    QualityTier::High,
    QualityTier::P2160,
    QualityTier::P1080,
    QualityTier::P720,
    QualityTier::HighSpeedHigh,
    QualityTier::HighSpeed1080p,
    QualityTier::HighSpeed720p,
];

/// Rates every picker should offer when available.
pub const STANDARD_RATES: [u32; 8] = [24, 25, 30, 50, 60, 90, 120, 240];

const SYNTHESIZED_RATES: [u32; 6] = [24, 25, 30, 60, 90, 120];
const HIGH_SPEED_RATES: [u32; 4] = [60, 90, 120, 240];

/// Integers covered by the AE ranges plus the ceilings of high-speed ranges.
pub fn primary_rates(characteristics: &DeviceCharacteristics, max_reasonable: u32) -> BTreeSet<u32> {
    let mut rates = BTreeSet::new();
    for range in &characteristics.fps_ranges {
        if range.min > range.max {
            log::debug!("Ignoring inverted AE range [{}, {}]", range.min, range.max);
            continue;
        }
        let lo = range.min.max(1);
        let hi = range.max.min(max_reasonable);
        rates.extend(lo..=hi);
    }
    for range in &characteristics.high_speed_fps_ranges {
        if range.max > 0 && range.max <= max_reasonable {
            rates.insert(range.max);
        }
    }
    rates
}

/// Highest frame rate of any legacy recording profile for `device`.
pub fn legacy_ceiling<T: LegacyQualityTable + ?Sized>(
    table: &T,
    device: &PhysicalDeviceId,
    max_reasonable: u32,
) -> Option<u32> {
    LEGACY_RATE_TIERS
        .iter()
        .filter_map(|&tier| legacy_profile(table, device, tier))
        .map(|profile| profile.frame_rate)
        .filter(|&fps| fps > 0 && fps <= max_reasonable)
        .max()
}

/// Rate list for devices whose AE ranges are empty, built from a ceiling.
pub fn synthesize_from_ceiling(ceiling: u32) -> BTreeSet<u32> {
    let mut rates: BTreeSet<u32> = (10..=ceiling)
        .step_by(5)
        .filter(|fps| *fps <= 30 || fps % 30 == 0)
        .collect();
    rates.extend(SYNTHESIZED_RATES.iter().copied().filter(|&r| r <= ceiling));
    rates
}

/// Add the high-speed rates implied by a legacy ceiling above the default rate.
pub fn augment_with_legacy(mut rates: BTreeSet<u32>, ceiling: Option<u32>, default_rate: u32) -> BTreeSet<u32> {
    if let Some(ceiling) = ceiling.filter(|&c| c > default_rate) {
        let before = rates.len();
        rates.extend(HIGH_SPEED_RATES.iter().copied().filter(|&r| r <= ceiling));
        if rates.len() > before {
            log::debug!("Legacy profiles raised the frame-rate ceiling to {}", ceiling);
        }
    }
    rates
}

/// Force-include quirk rates for matching manufacturers.
pub fn apply_quirks(mut rates: BTreeSet<u32>, quirks: &[VendorQuirk], manufacturer: Option<&str>) -> BTreeSet<u32> {
    let Some(manufacturer) = manufacturer else {
        return rates;
    };
    for quirk in quirks.iter().filter(|q| q.matches(manufacturer)) {
        let triggered = rates.iter().any(|&r| r >= quirk.when_any_at_least);
        if triggered && rates.insert(quirk.force_frame_rate) {
            log::info!(
                "Applied {} quirk: added {} fps",
                quirk.vendor,
                quirk.force_frame_rate
            );
        }
    }
    rates
}

/// Shrink lists longer than `threshold` to standard rates, multiples of 5 up
/// to 60 and everything above 60. The default and highest rates survive.
pub fn collapse(rates: BTreeSet<u32>, threshold: usize, default_rate: u32) -> BTreeSet<u32> {
    if rates.len() <= threshold {
        return rates;
    }

    let mut kept: BTreeSet<u32> = STANDARD_RATES
        .iter()
        .copied()
        .filter(|r| rates.contains(r))
        .collect();
    kept.extend(rates.iter().copied().filter(|&r| (r % 5 == 0 && r <= 60) || r > 60));
    if rates.contains(&default_rate) {
        kept.insert(default_rate);
    }
    if let Some(&highest) = rates.iter().next_back() {
        kept.insert(highest);
    }

    log::debug!("Collapsed {} frame rates to {}", rates.len(), kept.len());
    kept
}

/// Ascending list of frame rates `device` can record at. Never empty.
pub fn supported_frame_rates<H, T>(
    hardware: &H,
    table: &T,
    device: &PhysicalDeviceId,
    config: &EngineConfig,
) -> Vec<u32>
where
    H: HardwareQuery + ?Sized,
    T: LegacyQualityTable + ?Sized,
{
    let default_rate = config.defaults.frame_rate;
    let max_reasonable = config.frame_rate.max_reasonable;

    let characteristics = match hardware.characteristics_of(device) {
        Ok(ch) => Some(ch),
        Err(e) => {
            log::warn!("Frame-rate ranges unavailable for camera {}: {}", device, e);
            None
        }
    };

    let primary = characteristics
        .as_ref()
        .map(|ch| primary_rates(ch, max_reasonable))
        .unwrap_or_default();
    let ceiling = legacy_ceiling(table, device, max_reasonable);

    let rates = if !primary.is_empty() {
        augment_with_legacy(primary, ceiling, default_rate)
    } else if characteristics.is_some() || ceiling.is_some() {
        let effective = ceiling.unwrap_or(default_rate).max(default_rate);
        log::info!(
            "Camera {} reports no AE ranges, synthesising rates up to {} fps",
            device,
            effective
        );
        synthesize_from_ceiling(effective)
    } else {
        BTreeSet::new()
    };

    let manufacturer = match hardware.manufacturer() {
        Ok(m) => Some(m),
        Err(e) => {
            log::warn!("Manufacturer unavailable, skipping vendor quirks: {}", e);
            None
        }
    };
    let rates = apply_quirks(rates, &config.quirks, manufacturer.as_deref());
    let rates = collapse(rates, config.frame_rate.collapse_threshold, default_rate);

    let had_default_or_higher = rates.iter().any(|&r| r >= default_rate);
    let mut list: Vec<u32> = rates.into_iter().collect();
    if list.is_empty() {
        let err = CapabilityError::EmptyCapabilitySet(format!(
            "no frame rates for camera {}, using {} fps",
            device, default_rate
        ));
        log::warn!("{}", err);
        list.push(default_rate);
    }

    assert_invariant!(
        list.windows(2).all(|w| w[0] < w[1]),
        "Frame rates are strictly ascending",
        "frame_rate"
    );
    assert_invariant!(list.iter().all(|&r| r > 0), "Frame rates are positive", "frame_rate");
    assert_invariant!(
        !had_default_or_higher || list.iter().any(|&r| r >= default_rate),
        "Default or higher frame rate survives",
        "frame_rate"
    );

    list
}
