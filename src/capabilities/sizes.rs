//! Raw frame-size catalog for one lens.

use crate::platform::HardwareQuery;
use crate::types::{FrameSize, PhysicalDeviceId};

/// Plausible video sizes the device advertises, in hardware order.
///
/// Query failures and a missing stream configuration table both produce an
/// empty list so the curator can fall back to the legacy tiers.
pub fn supported_sizes<H: HardwareQuery + ?Sized>(
    hardware: &H,
    device: &PhysicalDeviceId,
) -> Vec<FrameSize> {
    let characteristics = match hardware.characteristics_of(device) {
        Ok(ch) => ch,
        Err(e) => {
            log::warn!("Frame sizes unavailable for camera {}: {}", device, e);
            return Vec::new();
        }
    };

    let Some(raw) = characteristics.output_sizes else {
        log::warn!("Camera {} exposes no stream configuration table", device);
        return Vec::new();
    };

    let mut sizes: Vec<FrameSize> = Vec::with_capacity(raw.len());
    for size in raw {
        if size.is_plausible_video_size() && !sizes.contains(&size) {
            sizes.push(size);
        }
    }

    log::debug!("Camera {} reports {} plausible video sizes", device, sizes.len());
    sizes
}
