//! Core value types shared by every capability stage.

use crate::errors::CapabilityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque platform handle for one physical camera device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhysicalDeviceId(String);

impl PhysicalDeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhysicalDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhysicalDeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PhysicalDeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Logical camera grouping the user picks between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CameraRole {
    Front,
    Back,
}

impl CameraRole {
    pub const ALL: [CameraRole; 2] = [CameraRole::Front, CameraRole::Back];

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraRole::Front => "front",
            CameraRole::Back => "back",
        }
    }

    /// Hardware facing that belongs to this role.
    pub fn facing(&self) -> LensFacing {
        match self {
            CameraRole::Front => LensFacing::Front,
            CameraRole::Back => LensFacing::Back,
        }
    }
}

impl Default for CameraRole {
    fn default() -> Self {
        CameraRole::Back
    }
}

impl fmt::Display for CameraRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraRole {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(CameraRole::Front),
            "back" | "rear" => Ok(CameraRole::Back),
            other => Err(CapabilityError::UnsupportedSelection(format!(
                "unknown camera role '{}'",
                other
            ))),
        }
    }
}

/// Facing reported by the hardware for a single device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LensFacing {
    Front,
    Back,
    External,
}

/// Focal-length class of a back lens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LensClass {
    Main,
    UltraWide,
    WideAngle,
    Standard,
    Portrait,
    Telephoto,
}

impl LensClass {
    pub fn label(&self) -> &'static str {
        match self {
            LensClass::Main => "Main",
            LensClass::UltraWide => "Ultra-Wide",
            LensClass::WideAngle => "Wide-Angle",
            LensClass::Standard => "Standard",
            LensClass::Portrait => "Portrait",
            LensClass::Telephoto => "Telephoto",
        }
    }
}

/// One selectable lens within a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensDescriptor {
    pub id: PhysicalDeviceId,
    pub role: CameraRole,
    pub focal_length_mm: Option<f32>,
    pub is_default: bool,
    pub display_label: String,
    pub class: LensClass,
}

/// Capture size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const MIN_WIDTH: u32 = 320;
    pub const MIN_HEIGHT: u32 = 240;
    pub const MIN_ASPECT: f64 = 1.0;
    pub const MAX_ASPECT: f64 = 2.5;

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Landscape video size no smaller than QVGA with a sane aspect ratio.
    pub fn is_plausible_video_size(&self) -> bool {
        if self.width < Self::MIN_WIDTH || self.height < Self::MIN_HEIGHT {
            return false;
        }
        let ar = self.aspect_ratio();
        (Self::MIN_ASPECT..=Self::MAX_ASPECT).contains(&ar)
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for FrameSize {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CapabilityError::UnsupportedSelection(format!("invalid frame size '{}'", s));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        Ok(FrameSize::new(width, height))
    }
}

/// Picker entry for a capture size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOption {
    pub size: FrameSize,
    pub label: String,
}

/// Inclusive frame-rate range as reported by the auto-exposure API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpsRange {
    pub min: u32,
    pub max: u32,
}

impl FpsRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f32,
    pub max: f32,
}

impl ZoomRange {
    pub const DEFAULT_MIN: f32 = 0.5;
    pub const DEFAULT_MAX: f32 = 5.0;
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Video codecs the recorder knows how to drive.
///
/// Declaration order of [`CodecOption::PRIORITY`] is the replacement order
/// used when a stored codec is no longer supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecOption {
    #[serde(rename = "HEVC")]
    Hevc,
    #[serde(rename = "AVC")]
    Avc,
}

impl CodecOption {
    pub const PRIORITY: [CodecOption; 2] = [CodecOption::Hevc, CodecOption::Avc];

    pub fn mime_type(&self) -> &'static str {
        match self {
            CodecOption::Hevc => "video/hevc",
            CodecOption::Avc => "video/avc",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CodecOption::Hevc => "H.265",
            CodecOption::Avc => "H.264",
        }
    }

    /// Stable identifier used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            CodecOption::Hevc => "HEVC",
            CodecOption::Avc => "AVC",
        }
    }
}

impl fmt::Display for CodecOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecOption {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HEVC" | "H265" | "H.265" => Ok(CodecOption::Hevc),
            "AVC" | "H264" | "H.264" => Ok(CodecOption::Avc),
            other => Err(CapabilityError::UnsupportedSelection(format!(
                "unknown codec '{}'",
                other
            ))),
        }
    }
}

/// Legacy per-quality recording profile tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Low,
    High,
    Qcif,
    Cif,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "2k")]
    Qhd2k,
    #[serde(rename = "2160p")]
    P2160,
    #[serde(rename = "8k")]
    Uhd8k,
    HighSpeedHigh,
    #[serde(rename = "high_speed_720p")]
    HighSpeed720p,
    #[serde(rename = "high_speed_1080p")]
    HighSpeed1080p,
}

/// Recording profile from the legacy quality table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyProfile {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub bitrate: u32,
}

impl LegacyProfile {
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }
}

/// Everything the characteristics query reports for one device.
///
/// `output_sizes` is `None` when the device exposes no stream configuration
/// table at all, which is distinct from an empty table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCharacteristics {
    pub facing: Option<LensFacing>,
    pub focal_lengths_mm: Vec<f32>,
    pub output_sizes: Option<Vec<FrameSize>>,
    pub fps_ranges: Vec<FpsRange>,
    pub high_speed_fps_ranges: Vec<FpsRange>,
    pub zoom_ratio_range: Option<ZoomRange>,
}

impl DeviceCharacteristics {
    /// First advertised focal length, the one used for classification.
    pub fn primary_focal_length(&self) -> Option<f32> {
        self.focal_lengths_mm
            .first()
            .copied()
            .filter(|f| f.is_finite() && *f > 0.0)
    }
}

/// The validated, currently-active recording parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveConfiguration {
    pub role: CameraRole,
    pub lens_id: PhysicalDeviceId,
    pub resolution: FrameSize,
    pub frame_rate: u32,
    pub zoom: f32,
    pub codec: CodecOption,
    pub bitrate_kbps: u32,
    pub bitrate_is_custom: bool,
}

impl EffectiveConfiguration {
    /// "12 Mbps (Auto)" style summary for a settings row.
    pub fn bitrate_label(&self) -> String {
        format!(
            "{} Mbps {}",
            self.bitrate_kbps / 1000,
            if self.bitrate_is_custom { "(Custom)" } else { "(Auto)" }
        )
    }
}
