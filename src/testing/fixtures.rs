//! Device profiles modelled on real phones
//!
//! Each fixture reproduces a camera stack behaviour that broke capability
//! detection at some point: a lone back camera, a triple back array with
//! duplicate focal classes, a vendor that hides 60fps from the AE ranges, a
//! HAL that throws on every query, and a device that only fills the legacy
//! profile table.

use crate::platform::{DeviceProfile, FailureInjection, ProfilePlatform, ProfiledDevice};
use crate::types::QualityTier;

const FULL_SIZE_TABLE: &[(u32, u32)] = &[
    (4000, 3000),
    (3840, 2160),
    (3264, 2448),
    (2560, 1440),
    (1920, 1440),
    (1920, 1080),
    (1440, 1080),
    (1280, 720),
    (960, 720),
    (720, 480),
    (640, 480),
    (352, 288),
    (320, 240),
    (176, 144),
];

const BOTH_ENCODERS: &[&str] = &["video/hevc", "video/avc"];

fn encoders(mimes: &[&str]) -> Vec<String> {
    mimes.iter().map(|m| m.to_string()).collect()
}

/// Budget phone: one back camera at 4.2mm, one front camera.
pub fn single_back_lens() -> DeviceProfile {
    DeviceProfile {
        manufacturer: "Nokia".to_string(),
        model: "G10".to_string(),
        encoders: encoders(&["video/avc"]),
        devices: vec![
            ProfiledDevice::back("0")
                .with_focal_length(4.2)
                .with_sizes(&[(1920, 1080), (1280, 720), (640, 480), (176, 144)])
                .with_fps_ranges(&[(15, 15), (15, 30), (30, 30)])
                .with_zoom_max(4.0),
            ProfiledDevice::front("1")
                .with_focal_length(2.9)
                .with_sizes(&[(1920, 1080), (1280, 720)])
                .with_fps_ranges(&[(15, 30)]),
        ],
        failures: FailureInjection::default(),
    }
}

/// Flagship with main, ultra-wide, telephoto and a second ultra-wide that
/// duplicates the first one's class.
pub fn triple_back_array() -> DeviceProfile {
    DeviceProfile {
        manufacturer: "Google".to_string(),
        model: "Pixel 8 Pro".to_string(),
        encoders: encoders(BOTH_ENCODERS),
        devices: vec![
            ProfiledDevice::back("0")
                .with_focal_length(6.9)
                .with_sizes(FULL_SIZE_TABLE)
                .with_fps_ranges(&[(15, 30), (30, 30), (60, 60)])
                .with_high_speed_ranges(&[(120, 120), (240, 240)])
                .with_zoom_max(10.0)
                .with_legacy(QualityTier::P2160, 3840, 2160, 30)
                .with_legacy(QualityTier::P1080, 1920, 1080, 60),
            ProfiledDevice::front("1")
                .with_focal_length(2.7)
                .with_sizes(&[(3840, 2160), (1920, 1080), (1280, 720)])
                .with_fps_ranges(&[(15, 30), (30, 30)]),
            ProfiledDevice::back("2")
                .with_focal_length(2.2)
                .with_sizes(&[(3840, 2160), (1920, 1080), (1280, 720)])
                .with_fps_ranges(&[(15, 30), (30, 30)])
                .with_zoom_max(2.0),
            ProfiledDevice::back("3")
                .with_focal_length(18.0)
                .with_sizes(&[(3840, 2160), (1920, 1080)])
                .with_fps_ranges(&[(30, 30)])
                .with_zoom_max(30.0),
            ProfiledDevice::back("4")
                .with_focal_length(1.9)
                .with_sizes(&[(1920, 1080)])
                .with_fps_ranges(&[(30, 30)]),
        ],
        failures: FailureInjection::default(),
    }
}

/// Vendor whose AE ranges stop at 30fps while high-speed modes go to 120.
pub fn samsung_underreporter() -> DeviceProfile {
    DeviceProfile {
        manufacturer: "samsung".to_string(),
        model: "SM-S911B".to_string(),
        encoders: encoders(BOTH_ENCODERS),
        devices: vec![
            ProfiledDevice::back("0")
                .with_focal_length(5.4)
                .with_sizes(&[(7680, 4320), (3840, 2160), (1920, 1080), (1280, 720)])
                .with_fps_ranges(&[(10, 30), (24, 24), (30, 30)])
                .with_high_speed_ranges(&[(120, 120)])
                .with_zoom_max(8.0),
            ProfiledDevice::front("1")
                .with_focal_length(2.2)
                .with_sizes(&[(1920, 1080)])
                .with_fps_ranges(&[(15, 30)]),
        ],
        failures: FailureInjection::default(),
    }
}

/// Every camera query throws, the codec list cannot be read either.
pub fn broken_hal() -> DeviceProfile {
    DeviceProfile {
        manufacturer: "Unknown".to_string(),
        model: "Emulator".to_string(),
        encoders: Vec::new(),
        devices: vec![
            ProfiledDevice::back("0").failing().failing_legacy(),
            ProfiledDevice::front("1").failing().failing_legacy(),
        ],
        failures: FailureInjection {
            list_devices: true,
            manufacturer: true,
            encoders: true,
        },
    }
}

/// Old device with no stream configuration table and no AE ranges; only the
/// legacy profile table knows anything.
pub fn legacy_only_device() -> DeviceProfile {
    DeviceProfile {
        manufacturer: "Motorola".to_string(),
        model: "Moto E".to_string(),
        encoders: encoders(&["video/avc"]),
        devices: vec![
            ProfiledDevice::back("0")
                .with_focal_length(3.5)
                .with_legacy(QualityTier::High, 1920, 1080, 30)
                .with_legacy(QualityTier::P1080, 1920, 1080, 30)
                .with_legacy(QualityTier::P720, 1280, 720, 30)
                .with_legacy(QualityTier::P480, 720, 480, 30)
                .with_legacy(QualityTier::Qcif, 176, 144, 15)
                .with_legacy(QualityTier::HighSpeed720p, 1280, 720, 120),
            ProfiledDevice::front("1")
                .with_legacy(QualityTier::P480, 640, 480, 30),
        ],
        failures: FailureInjection::default(),
    }
}

/// Wrap a fixture profile in a platform.
pub fn platform(profile: DeviceProfile) -> ProfilePlatform {
    ProfilePlatform::new(profile)
}
