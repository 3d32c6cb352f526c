//! Capability stages, one module per option list.
//!
//! Each stage is a set of free functions over the platform traits so it can
//! be exercised on its own. [`crate::engine::CapabilityEngine`] wires them
//! together and owns the caches.

pub mod bitrate;
pub mod codec;
pub mod frame_rate;
pub mod lenses;
pub mod resolution;
pub mod sizes;
pub mod zoom;

pub use bitrate::{clamp_custom, default_bitrate_kbps};
pub use codec::{reconcile_codec, supported_codecs};
pub use frame_rate::supported_frame_rates;
pub use lenses::{classify_focal_length, list_lenses, FALLBACK_LENS_LABEL};
pub use resolution::{curate, legacy_sizes, resolution_label, CuratedResolutions};
pub use sizes::supported_sizes;
pub use zoom::{policy_default_zoom, snap_zoom, zoom_steps, zoom_steps_for};
