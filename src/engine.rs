//! Effective configuration resolver
//!
//! [`CapabilityEngine`] ties the capability stages to the platform
//! collaborators and reconciles them with the stored preferences:
//!
//! 1. lens: stored id if still listed, else the default lens
//! 2. resolution: curated against the resolved lens
//! 3. frame rate: stored rate if offered, else the default rate, else the lowest
//! 4. zoom: stored ratio snapped to the nearest step
//! 5. codec: stored codec if supported, else the highest-priority one
//! 6. bitrate: automatic from resolution and frame rate, or the clamped custom value
//!
//! Every replacement is staged and written back as one batch before
//! [`CapabilityEngine::resolve`] returns, and only keys whose value actually
//! changes are written. A second resolve with no outside change is a no-op.

use crate::assert_invariant;
use crate::capabilities::{self, CuratedResolutions};
use crate::config::EngineConfig;
use crate::platform::{EncoderCapability, HardwareQuery, LegacyQualityTable};
use crate::preferences::{PrefKey, PrefValue, PreferenceStore, PreferenceWrites, StoredPreferences};
use crate::types::{
    CameraRole, CodecOption, EffectiveConfiguration, FrameSize, LensDescriptor, PhysicalDeviceId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Option lists that depend only on the hardware of one lens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensCapabilities {
    /// Plausible sizes in hardware order, before curation.
    pub raw_sizes: Vec<FrameSize>,
    pub frame_rates: Vec<u32>,
    pub zoom_steps: Vec<f32>,
}

/// Per-role lens lists and per-(role, lens) capabilities.
///
/// Lives as long as a settings screen; drop it (or call [`clear`]) when the
/// screen resumes so hardware changes are picked up.
///
/// [`clear`]: CapabilityCache::clear
#[derive(Debug, Clone, Default)]
pub struct CapabilityCache {
    lenses: HashMap<CameraRole, Vec<LensDescriptor>>,
    per_lens: HashMap<(CameraRole, PhysicalDeviceId), LensCapabilities>,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.lenses.clear();
        self.per_lens.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lenses.is_empty() && self.per_lens.is_empty()
    }
}

/// One stored value the resolver replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub key: String,
    pub previous: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveOutcome {
    pub configuration: EffectiveConfiguration,
    /// Stored values that were invalid and got replaced.
    pub corrections: Vec<Correction>,
    /// Preference writes performed, including first-time materialisation.
    pub writes: usize,
}

pub struct CapabilityEngine {
    hardware: Arc<dyn HardwareQuery>,
    legacy: Arc<dyn LegacyQualityTable>,
    encoders: Arc<dyn EncoderCapability>,
    config: EngineConfig,
    codecs: OnceLock<Vec<CodecOption>>,
}

impl fmt::Debug for CapabilityEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityEngine")
            .field("config", &self.config)
            .field("codecs", &self.codecs.get())
            .finish_non_exhaustive()
    }
}

impl CapabilityEngine {
    pub fn new(
        hardware: Arc<dyn HardwareQuery>,
        legacy: Arc<dyn LegacyQualityTable>,
        encoders: Arc<dyn EncoderCapability>,
        config: EngineConfig,
    ) -> Self {
        Self {
            hardware,
            legacy,
            encoders,
            config,
            codecs: OnceLock::new(),
        }
    }

    /// Build an engine from one object that implements every collaborator.
    pub fn from_platform<P>(platform: Arc<P>, config: EngineConfig) -> Self
    where
        P: HardwareQuery + LegacyQualityTable + EncoderCapability + 'static,
    {
        Self::new(platform.clone(), platform.clone(), platform, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn list_lenses(&self, role: CameraRole) -> Vec<LensDescriptor> {
        capabilities::list_lenses(&*self.hardware, role, &self.config)
    }

    pub fn supported_sizes(&self, lens: &PhysicalDeviceId) -> Vec<FrameSize> {
        capabilities::supported_sizes(&*self.hardware, lens)
    }

    pub fn curated_resolutions(&self, lens: &PhysicalDeviceId, persisted: FrameSize) -> CuratedResolutions {
        let raw = self.supported_sizes(lens);
        self.curate_sizes(lens, &raw, persisted)
    }

    pub fn supported_frame_rates(&self, lens: &PhysicalDeviceId) -> Vec<u32> {
        capabilities::supported_frame_rates(&*self.hardware, &*self.legacy, lens, &self.config)
    }

    pub fn zoom_steps(&self, lens: &PhysicalDeviceId) -> Vec<f32> {
        capabilities::zoom_steps(&*self.hardware, lens, &self.config.zoom)
    }

    /// Supported codecs, probed once per engine.
    pub fn supported_codecs(&self) -> Vec<CodecOption> {
        self.codecs
            .get_or_init(|| {
                let codecs = capabilities::supported_codecs(&*self.encoders, self.config.defaults.codec);
                log::info!("Supported codecs: {:?}", codecs);
                codecs
            })
            .clone()
    }

    pub fn cached_lenses(&self, cache: &mut CapabilityCache, role: CameraRole) -> Vec<LensDescriptor> {
        cache
            .lenses
            .entry(role)
            .or_insert_with(|| self.list_lenses(role))
            .clone()
    }

    pub fn cached_lens_capabilities(
        &self,
        cache: &mut CapabilityCache,
        role: CameraRole,
        lens: &PhysicalDeviceId,
    ) -> LensCapabilities {
        cache
            .per_lens
            .entry((role, lens.clone()))
            .or_insert_with(|| LensCapabilities {
                raw_sizes: self.supported_sizes(lens),
                frame_rates: self.supported_frame_rates(lens),
                zoom_steps: self.zoom_steps(lens),
            })
            .clone()
    }

    /// Curate an already-fetched raw size list for `lens`.
    pub fn curate_sizes(
        &self,
        lens: &PhysicalDeviceId,
        raw: &[FrameSize],
        persisted: FrameSize,
    ) -> CuratedResolutions {
        capabilities::curate(
            raw,
            || capabilities::legacy_sizes(&*self.legacy, lens),
            persisted,
        )
    }

    /// Resolve `role` against the stored preferences and write back corrections.
    pub fn resolve(&self, role: CameraRole, store: &mut dyn PreferenceStore) -> EffectiveConfiguration {
        self.resolve_detailed(role, store, &mut CapabilityCache::new())
            .configuration
    }

    pub fn resolve_detailed(
        &self,
        role: CameraRole,
        store: &mut dyn PreferenceStore,
        cache: &mut CapabilityCache,
    ) -> ResolveOutcome {
        let stored = StoredPreferences::load(&*store, role);
        let mut writes = PreferenceWrites::new();
        let mut corrections = Vec::new();

        let mut correct = |key: PrefKey, previous: String, value: String| {
            log::info!("Corrected {}: {} -> {}", key, previous, value);
            corrections.push(Correction {
                key: key.to_string(),
                previous,
                value,
            });
        };

        // 1. lens
        let lenses = self.cached_lenses(cache, role);
        let lens = match stored
            .lens_id
            .as_ref()
            .and_then(|id| lenses.iter().find(|l| &l.id == id))
        {
            Some(lens) => lens.clone(),
            None => {
                let default = lenses
                    .iter()
                    .find(|l| l.is_default)
                    .or_else(|| lenses.first())
                    .cloned()
                    .unwrap_or_else(|| capabilities::lenses::fallback_lens_for(role, &self.config));
                if let Some(previous) = &stored.lens_id {
                    correct(PrefKey::SelectedLens(role), previous.to_string(), default.id.to_string());
                }
                default
            }
        };
        writes.stage_if_changed(&*store, PrefKey::SelectedLens(role), lens.id.as_str().into());

        let caps = self.cached_lens_capabilities(cache, role, &lens.id);

        // 2. resolution
        let persisted = stored.resolution.unwrap_or_else(|| self.config.default_resolution());
        let curated = self.curate_sizes(&lens.id, &caps.raw_sizes, persisted);
        let resolution = curated.selected;
        if let (Some(previous), Some(_)) = (stored.resolution, curated.correction) {
            correct(PrefKey::ResolutionWidth, previous.to_string(), resolution.to_string());
        }
        writes.stage_if_changed(&*store, PrefKey::ResolutionWidth, resolution.width.into());
        writes.stage_if_changed(&*store, PrefKey::ResolutionHeight, resolution.height.into());

        // 3. frame rate
        let default_rate = self.config.defaults.frame_rate;
        let frame_rate = match stored.frame_rate.filter(|r| caps.frame_rates.contains(r)) {
            Some(rate) => rate,
            None => {
                let replacement = if caps.frame_rates.contains(&default_rate) {
                    default_rate
                } else {
                    caps.frame_rates.first().copied().unwrap_or(default_rate)
                };
                if let Some(previous) = stored.frame_rate {
                    correct(PrefKey::FrameRate(role), previous.to_string(), replacement.to_string());
                }
                replacement
            }
        };
        writes.stage_if_changed(&*store, PrefKey::FrameRate(role), frame_rate.into());

        // 4. zoom
        let wanted = stored
            .zoom
            .unwrap_or_else(|| capabilities::policy_default_zoom(&lens, &self.config.zoom));
        let zoom = capabilities::snap_zoom(wanted, &caps.zoom_steps);
        if let Some(previous) = stored.zoom.filter(|z| *z != zoom) {
            correct(PrefKey::Zoom(role), previous.to_string(), zoom.to_string());
        }
        writes.stage_if_changed(&*store, PrefKey::Zoom(role), zoom.into());

        // 5. codec
        let supported = self.supported_codecs();
        let codec = capabilities::reconcile_codec(stored.codec, &supported, self.config.defaults.codec);
        if let Some(previous) = stored.codec.filter(|c| *c != codec) {
            correct(PrefKey::Codec, previous.to_string(), codec.to_string());
        }
        writes.stage_if_changed(&*store, PrefKey::Codec, codec.as_str().into());

        // 6. bitrate
        let auto_kbps = capabilities::default_bitrate_kbps(resolution, frame_rate);
        let bitrate_kbps = if stored.bitrate_custom {
            match stored.bitrate_custom_kbps {
                Some(custom) => {
                    let clamped = capabilities::clamp_custom(custom, &self.config.bitrate);
                    if clamped != custom {
                        correct(PrefKey::BitrateCustomKbps, custom.to_string(), clamped.to_string());
                        writes.stage(PrefKey::BitrateCustomKbps, clamped.into());
                    }
                    clamped
                }
                None => {
                    log::debug!("Custom bitrate enabled without a value, using {} kbps", auto_kbps);
                    auto_kbps
                }
            }
        } else {
            auto_kbps
        };

        let configuration = EffectiveConfiguration {
            role,
            lens_id: lens.id.clone(),
            resolution,
            frame_rate,
            zoom,
            codec,
            bitrate_kbps,
            bitrate_is_custom: stored.bitrate_custom,
        };

        assert_invariant!(
            lenses.iter().any(|l| l.id == configuration.lens_id),
            "Resolved lens is listed for its role",
            "resolve"
        );
        assert_invariant!(
            curated.contains(configuration.resolution),
            "Resolved resolution is offered",
            "resolve"
        );
        assert_invariant!(
            caps.frame_rates.is_empty() || caps.frame_rates.contains(&configuration.frame_rate),
            "Resolved frame rate is offered",
            "resolve"
        );
        assert_invariant!(
            supported.contains(&configuration.codec),
            "Resolved codec is supported",
            "resolve"
        );

        let staged = writes.len();
        let written = writes.apply(store);
        if staged > 0 {
            log::debug!("Resolve for {} role wrote {}/{} preferences", role, written, staged);
        }

        ResolveOutcome {
            configuration,
            corrections,
            writes: written,
        }
    }

    /// Persist the policy zoom for a freshly selected lens.
    pub(crate) fn stage_lens_selection(&self, lens: &LensDescriptor, writes: &mut PreferenceWrites) {
        writes.stage(PrefKey::SelectedLens(lens.role), lens.id.as_str().into());
        let zoom = capabilities::policy_default_zoom(lens, &self.config.zoom);
        writes.stage(PrefKey::Zoom(lens.role), PrefValue::from(zoom));
    }
}
