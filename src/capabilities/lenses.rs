//! Device enumeration and lens classification.

use crate::assert_invariant;
use crate::config::EngineConfig;
use crate::platform::HardwareQuery;
use crate::types::{CameraRole, LensClass, LensDescriptor, PhysicalDeviceId};
use std::cmp::Ordering;
use std::collections::HashSet;

pub const FALLBACK_LENS_LABEL: &str = "Default Camera";

/// Classify a back lens by its primary focal length.
pub fn classify_focal_length(focal_mm: Option<f32>) -> LensClass {
    match focal_mm {
        Some(f) if f <= 3.0 => LensClass::UltraWide,
        Some(f) if f <= 6.0 => LensClass::WideAngle,
        Some(f) if f >= 70.0 => LensClass::Telephoto,
        Some(f) if f >= 50.0 => LensClass::Portrait,
        _ => LensClass::Standard,
    }
}

/// List the selectable lenses for `role`.
///
/// Never returns an empty list, and exactly one entry is the default.
pub fn list_lenses<H: HardwareQuery + ?Sized>(
    hardware: &H,
    role: CameraRole,
    config: &EngineConfig,
) -> Vec<LensDescriptor> {
    let default_id = default_device_id(role, config);

    let ids = match hardware.list_device_ids() {
        Ok(ids) => ids,
        Err(e) => {
            log::warn!("Camera enumeration failed for {} role: {}", role, e);
            return vec![fallback_lens(role, default_id)];
        }
    };

    let mut seen_ids = HashSet::new();
    let mut candidates: Vec<(PhysicalDeviceId, Option<f32>)> = Vec::new();
    for id in ids {
        if !seen_ids.insert(id.clone()) {
            continue;
        }
        match hardware.characteristics_of(&id) {
            Ok(ch) if ch.facing == Some(role.facing()) => {
                candidates.push((id, ch.primary_focal_length()));
            }
            Ok(_) => {}
            Err(e) => log::warn!("Skipping camera {}: {}", id, e),
        }
    }

    if candidates.is_empty() {
        log::warn!(
            "No {} cameras reported, using {} as the default device",
            role,
            default_id
        );
        return vec![fallback_lens(role, default_id)];
    }

    candidates.sort_by(|a, b| compare_ids(&a.0, &b.0, &default_id));
    let chosen_default = if candidates.iter().any(|(id, _)| *id == default_id) {
        default_id
    } else {
        let first = candidates[0].0.clone();
        log::info!(
            "Factory default camera {} missing for {} role, using {}",
            default_id,
            role,
            first
        );
        first
    };

    // Single-camera phones keep a plain "Main" label rather than a guessed class.
    let classify = role == CameraRole::Back && candidates.len() >= 2;

    let mut lenses: Vec<LensDescriptor> = Vec::with_capacity(candidates.len());
    let mut seen_classes: HashSet<LensClass> = HashSet::new();
    for (id, focal) in candidates {
        let is_default = id == chosen_default;
        let class = if is_default {
            LensClass::Main
        } else if classify {
            classify_focal_length(focal)
        } else {
            LensClass::Standard
        };

        if role == CameraRole::Back && !seen_classes.insert(class) {
            log::debug!(
                "Dropping camera {} ({:?}): another lens already covers {}",
                id,
                focal,
                class.label()
            );
            continue;
        }

        let display_label = lens_label(role, &id, class, focal, is_default);
        lenses.push(LensDescriptor {
            id,
            role,
            focal_length_mm: focal,
            is_default,
            display_label,
            class,
        });
    }

    assert_invariant!(!lenses.is_empty(), "Lens list is never empty", "lenses");
    assert_invariant!(
        lenses.iter().filter(|l| l.is_default).count() == 1,
        "Exactly one lens per role is the default",
        "lenses"
    );

    log::debug!(
        "{} lenses for {} role: {:?}",
        lenses.len(),
        role,
        lenses.iter().map(|l| &l.display_label).collect::<Vec<_>>()
    );
    lenses
}

/// Synthetic default lens for `role` when enumeration has nothing to offer.
pub fn fallback_lens_for(role: CameraRole, config: &EngineConfig) -> LensDescriptor {
    fallback_lens(role, default_device_id(role, config))
}

fn default_device_id(role: CameraRole, config: &EngineConfig) -> PhysicalDeviceId {
    PhysicalDeviceId::new(match role {
        CameraRole::Back => config.defaults.back_device_id.as_str(),
        CameraRole::Front => config.defaults.front_device_id.as_str(),
    })
}

fn fallback_lens(role: CameraRole, id: PhysicalDeviceId) -> LensDescriptor {
    LensDescriptor {
        id,
        role,
        focal_length_mm: None,
        is_default: true,
        display_label: FALLBACK_LENS_LABEL.to_string(),
        class: LensClass::Main,
    }
}

fn lens_label(
    role: CameraRole,
    id: &PhysicalDeviceId,
    class: LensClass,
    focal: Option<f32>,
    is_default: bool,
) -> String {
    if is_default {
        return match role {
            CameraRole::Back => LensClass::Main.label().to_string(),
            CameraRole::Front => "Front".to_string(),
        };
    }

    let name = match role {
        CameraRole::Back => class.label(),
        CameraRole::Front => "Front",
    };
    match focal {
        Some(f) => format!("{} ({}) {}mm", name, id, f.round() as u32),
        None => format!("{} ({})", name, id),
    }
}

/// Default device first, then numeric ids ascending, then everything else.
fn compare_ids(a: &PhysicalDeviceId, b: &PhysicalDeviceId, default_id: &PhysicalDeviceId) -> Ordering {
    match (a == default_id, b == default_id) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    match (a.as_str().parse::<u64>(), b.as_str().parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.as_str().cmp(b.as_str()),
    }
}
