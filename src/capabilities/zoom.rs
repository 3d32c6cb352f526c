//! Zoom step generation.

use crate::assert_invariant;
use crate::config::ZoomConfig;
use crate::platform::HardwareQuery;
use crate::types::{LensDescriptor, PhysicalDeviceId};

pub const ZOOM_INCREMENT: f32 = 0.5;
pub const WIDE_LENS_ZOOM: f32 = 0.5;
pub const NEUTRAL_ZOOM: f32 = 1.0;
/// Hard upper bound for step generation, whatever the caller passes.
pub const ZOOM_RATIO_LIMIT: f32 = 1000.0;

/// Upper zoom bound reported by the hardware, or the configured default.
pub fn max_zoom<H: HardwareQuery + ?Sized>(hardware: &H, device: &PhysicalDeviceId, config: &ZoomConfig) -> f32 {
    let reported = match hardware.characteristics_of(device) {
        Ok(ch) => ch.zoom_ratio_range.map(|range| range.max),
        Err(e) => {
            log::warn!("Zoom range unavailable for camera {}: {}", device, e);
            None
        }
    };

    match reported {
        Some(max) if max.is_finite() && max > config.max_reasonable => {
            log::warn!(
                "Camera {} reports zoom bound {}, clamping to {}",
                device,
                max,
                config.max_reasonable
            );
            config.max_reasonable
        }
        Some(max) if max.is_finite() && max > 0.0 => max,
        Some(max) => {
            log::warn!(
                "Camera {} reports bogus zoom bound {}, assuming {}",
                device,
                max,
                config.default_max
            );
            config.default_max
        }
        None => config.default_max,
    }
}

fn round_one_decimal(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// 0.5x increments from 0.5 up to `max`, always including 1.0.
pub fn zoom_steps_for(max: f32) -> Vec<f32> {
    let max = if max.is_finite() { max.min(ZOOM_RATIO_LIMIT) } else { NEUTRAL_ZOOM };
    let count = (max / ZOOM_INCREMENT + 1e-3).floor().max(0.0) as u32;
    let mut steps: Vec<f32> = (1..=count)
        .map(|k| round_one_decimal(k as f32 * ZOOM_INCREMENT))
        .collect();
    steps.push(NEUTRAL_ZOOM);
    steps.sort_by(|a, b| a.total_cmp(b));
    steps.dedup();

    assert_invariant!(
        steps.windows(2).all(|w| w[1] - w[0] <= ZOOM_INCREMENT + 1e-4),
        "Zoom steps have no gap wider than 0.5",
        "zoom"
    );
    assert_invariant!(steps.contains(&NEUTRAL_ZOOM), "Zoom steps include 1.0", "zoom");
    steps
}

pub fn zoom_steps<H: HardwareQuery + ?Sized>(hardware: &H, device: &PhysicalDeviceId, config: &ZoomConfig) -> Vec<f32> {
    zoom_steps_for(max_zoom(hardware, device, config))
}

/// Nearest step to `value`; ties go to the lower step.
pub fn snap_zoom(value: f32, steps: &[f32]) -> f32 {
    if !value.is_finite() {
        return NEUTRAL_ZOOM;
    }
    steps
        .iter()
        .copied()
        .fold(None, |best: Option<f32>, step| match best {
            Some(b) if (b - value).abs() <= (step - value).abs() => Some(b),
            _ => Some(step),
        })
        .unwrap_or(NEUTRAL_ZOOM)
}

/// Starting zoom for a freshly selected lens.
///
/// Auxiliary wide lenses open at 0.5x so the preview shows their natural
/// field of view. Users can override this, it is not a hardware constraint.
pub fn policy_default_zoom(lens: &LensDescriptor, config: &ZoomConfig) -> f32 {
    let is_wide = lens
        .focal_length_mm
        .map_or(false, |f| f <= config.wide_focal_threshold_mm);
    if config.auto_wide_zoom && !lens.is_default && is_wide {
        WIDE_LENS_ZOOM
    } else {
        NEUTRAL_ZOOM
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::platform::{DeviceProfile, ProfilePlatform, ProfiledDevice};
    use crate::types::{CameraRole, LensClass};

    fn lens(focal: Option<f32>, is_default: bool) -> LensDescriptor {
        LensDescriptor {
            id: PhysicalDeviceId::from("2"),
            role: CameraRole::Back,
            focal_length_mm: focal,
            is_default,
            display_label: "test".to_string(),
            class: LensClass::UltraWide,
        }
    }

    #[test]
    fn test_steps_up_to_eight() {
        let steps = zoom_steps_for(8.0);
        assert_eq!(steps.len(), 16);
        assert_eq!(steps[0], 0.5);
        assert_eq!(steps[1], 1.0);
        assert_eq!(*steps.last().unwrap(), 8.0);
    }

    #[test]
    fn test_small_and_fractional_bounds() {
        assert_eq!(zoom_steps_for(0.2), vec![1.0]);
        assert_eq!(zoom_steps_for(2.7), vec![0.5, 1.0, 1.5, 2.0, 2.5]);
        assert_eq!(zoom_steps_for(1.0), vec![0.5, 1.0]);
    }

    #[test]
    fn test_max_zoom_sources() {
        let hw = ProfilePlatform::new(DeviceProfile {
            devices: vec![
                ProfiledDevice::back("0").with_zoom_max(10.0),
                ProfiledDevice::back("2"),
                ProfiledDevice::back("3").with_zoom_max(f32::NAN),
                ProfiledDevice::back("4").failing(),
            ],
            ..DeviceProfile::default()
        });
        let config = EngineConfig::default().zoom;
        assert_eq!(max_zoom(&hw, &PhysicalDeviceId::from("0"), &config), 10.0);
        assert_eq!(max_zoom(&hw, &PhysicalDeviceId::from("2"), &config), 5.0);
        assert_eq!(max_zoom(&hw, &PhysicalDeviceId::from("3"), &config), 5.0);
        assert_eq!(max_zoom(&hw, &PhysicalDeviceId::from("4"), &config), 5.0);
    }

    #[test]
    fn test_absurd_zoom_bound_is_clamped() {
        let hw = ProfilePlatform::new(DeviceProfile {
            devices: vec![
                ProfiledDevice::back("0").with_zoom_max(1.0e10),
                ProfiledDevice::back("1").with_zoom_max(100.0),
            ],
            ..DeviceProfile::default()
        });
        let config = EngineConfig::default().zoom;
        assert_eq!(max_zoom(&hw, &PhysicalDeviceId::from("0"), &config), 100.0);
        assert_eq!(max_zoom(&hw, &PhysicalDeviceId::from("1"), &config), 100.0);
        assert_eq!(zoom_steps(&hw, &PhysicalDeviceId::from("0"), &config).len(), 200);

        assert_eq!(zoom_steps_for(1.0e6).len(), 2000);
        assert_eq!(zoom_steps_for(f32::INFINITY), vec![0.5, 1.0]);
    }

    #[test]
    fn test_snap_to_nearest() {
        let steps = zoom_steps_for(5.0);
        assert_eq!(snap_zoom(1.2, &steps), 1.0);
        assert_eq!(snap_zoom(1.3, &steps), 1.5);
        assert_eq!(snap_zoom(1.25, &steps), 1.0);
        assert_eq!(snap_zoom(12.0, &steps), 5.0);
        assert_eq!(snap_zoom(0.1, &steps), 0.5);
        assert_eq!(snap_zoom(f32::NAN, &steps), 1.0);
        assert_eq!(snap_zoom(3.0, &[]), 1.0);
    }

    #[test]
    fn test_policy_default_zoom() {
        let config = EngineConfig::default().zoom;
        assert_eq!(policy_default_zoom(&lens(Some(2.2), false), &config), 0.5);
        assert_eq!(policy_default_zoom(&lens(Some(2.2), true), &config), 1.0);
        assert_eq!(policy_default_zoom(&lens(Some(15.0), false), &config), 1.0);
        assert_eq!(policy_default_zoom(&lens(None, false), &config), 1.0);

        let disabled = ZoomConfig {
            auto_wide_zoom: false,
            ..config
        };
        assert_eq!(policy_default_zoom(&lens(Some(2.2), false), &disabled), 1.0);
    }
}
