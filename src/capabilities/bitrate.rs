//! Bitrate defaults and custom-value clamping. All values are in kbps.

use crate::config::BitrateConfig;
use crate::types::FrameSize;

/// (minimum pixel count, kbps at 30 fps), highest tier first.
const BITRATE_TABLE: [(u64, u32); 5] = [
    (3840 * 2160, 45_000),
    (2560 * 1440, 16_000),
    (1920 * 1080, 12_000),
    (1280 * 720, 8_000),
    (854 * 480, 4_000),
];
const FLOOR_KBPS: u32 = 2_000;
const BASE_FPS: u32 = 30;

/// Automatic bitrate for a resolution and frame rate.
pub fn default_bitrate_kbps(size: FrameSize, frame_rate: u32) -> u32 {
    let pixels = size.area();
    let base = BITRATE_TABLE
        .iter()
        .find(|(min_pixels, _)| pixels >= *min_pixels)
        .map_or(FLOOR_KBPS, |&(_, kbps)| kbps);

    if frame_rate > BASE_FPS {
        let scaled = base as u64 * frame_rate as u64 / BASE_FPS as u64;
        scaled.min(u32::MAX as u64) as u32
    } else {
        base
    }
}

/// Clamp a custom bitrate into the accepted range.
///
/// Swapped bounds are reordered rather than passed to `u32::clamp`, which
/// panics when min > max.
pub fn clamp_custom(kbps: u32, config: &BitrateConfig) -> u32 {
    let low = config.min_custom_kbps.min(config.max_custom_kbps);
    let high = config.min_custom_kbps.max(config.max_custom_kbps);
    kbps.clamp(low, high)
}
