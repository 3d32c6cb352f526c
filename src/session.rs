//! Settings-screen session
//!
//! Owns the engine, the preference store and the capability cache for as long
//! as a settings screen is open. Every setter validates against the options
//! currently on offer, writes the new value and re-resolves, so the returned
//! configuration is always consistent with the hardware.

use crate::capabilities;
use crate::engine::{CapabilityCache, CapabilityEngine, ResolveOutcome};
use crate::errors::{CapabilityError, Result};
use crate::preferences::{PrefKey, PrefValue, PreferenceStore, PreferenceWrites};
use crate::types::{
    CameraRole, CodecOption, EffectiveConfiguration, FrameSize, LensDescriptor, PhysicalDeviceId,
    ResolutionOption,
};
use serde::{Deserialize, Serialize};

/// Everything a settings screen renders for one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraOptions {
    pub role: CameraRole,
    pub lenses: Vec<LensDescriptor>,
    pub resolutions: Vec<ResolutionOption>,
    pub frame_rates: Vec<u32>,
    pub zoom_steps: Vec<f32>,
    pub codecs: Vec<CodecOption>,
    /// False when there is only one lens to choose from.
    pub lens_picker_enabled: bool,
}

const ZOOM_MATCH_TOLERANCE: f32 = 0.01;

#[derive(Debug)]
pub struct SettingsSession<S: PreferenceStore> {
    engine: CapabilityEngine,
    store: S,
    cache: CapabilityCache,
}

impl<S: PreferenceStore> SettingsSession<S> {
    pub fn new(engine: CapabilityEngine, store: S) -> Self {
        Self {
            engine,
            store,
            cache: CapabilityCache::new(),
        }
    }

    pub fn engine(&self) -> &CapabilityEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Role the user last selected, back by default.
    pub fn current_role(&self) -> CameraRole {
        self.store
            .get(PrefKey::CameraRole)
            .and_then(|v| v.as_text().and_then(|s| s.parse().ok()))
            .unwrap_or_default()
    }

    pub fn resolve(&mut self, role: CameraRole) -> ResolveOutcome {
        self.engine
            .resolve_detailed(role, &mut self.store, &mut self.cache)
    }

    pub fn current_configuration(&mut self) -> EffectiveConfiguration {
        let role = self.current_role();
        self.resolve(role).configuration
    }

    /// Option lists for `role`, reconciled with the stored selections first.
    pub fn options(&mut self, role: CameraRole) -> CameraOptions {
        let configuration = self.resolve(role).configuration;
        let lenses = self.engine.cached_lenses(&mut self.cache, role);
        let caps = self
            .engine
            .cached_lens_capabilities(&mut self.cache, role, &configuration.lens_id);
        let curated = self.engine.curate_sizes(
            &configuration.lens_id,
            &caps.raw_sizes,
            configuration.resolution,
        );

        CameraOptions {
            role,
            lens_picker_enabled: lenses.len() > 1,
            lenses,
            resolutions: curated.options,
            frame_rates: caps.frame_rates,
            zoom_steps: caps.zoom_steps,
            codecs: self.engine.supported_codecs(),
        }
    }

    /// Drop cached capabilities, as when a settings screen resumes.
    pub fn refresh(&mut self) {
        log::debug!("Dropping cached camera capabilities");
        self.cache.clear();
    }

    pub fn set_role(&mut self, role: CameraRole) -> Result<EffectiveConfiguration> {
        self.store.set(PrefKey::CameraRole, role.as_str().into())?;
        log::info!("Camera role set to {}", role);
        Ok(self.resolve(role).configuration)
    }

    /// Switch the current role to another of its lenses.
    pub fn select_lens(&mut self, lens_id: &PhysicalDeviceId) -> Result<EffectiveConfiguration> {
        let role = self.current_role();
        let lenses = self.engine.cached_lenses(&mut self.cache, role);
        let lens = lenses.iter().find(|l| &l.id == lens_id).ok_or_else(|| {
            CapabilityError::UnsupportedSelection(format!(
                "lens {} is not available for the {} camera",
                lens_id, role
            ))
        })?;

        let current = self.store.get(PrefKey::SelectedLens(role));
        if current.as_ref().and_then(|v| v.as_text()) == Some(lens_id.as_str()) {
            log::debug!("Lens {} already selected for {} camera", lens_id, role);
            return Ok(self.resolve(role).configuration);
        }

        let mut writes = PreferenceWrites::new();
        self.engine.stage_lens_selection(lens, &mut writes);
        for key in writes.keys() {
            log::debug!("Lens selection writes {}", key);
        }
        self.write_all(writes)?;
        log::info!("Selected lens {} for {} camera", lens.display_label, role);
        Ok(self.resolve(role).configuration)
    }

    pub fn set_resolution(&mut self, size: FrameSize) -> Result<EffectiveConfiguration> {
        let options = self.options(self.current_role());
        if !options.resolutions.iter().any(|o| o.size == size) {
            return Err(CapabilityError::UnsupportedSelection(format!(
                "resolution {} is not offered",
                size
            )));
        }
        self.store.set(PrefKey::ResolutionWidth, size.width.into())?;
        self.store.set(PrefKey::ResolutionHeight, size.height.into())?;
        Ok(self.resolve(options.role).configuration)
    }

    pub fn set_frame_rate(&mut self, fps: u32) -> Result<EffectiveConfiguration> {
        let options = self.options(self.current_role());
        if !options.frame_rates.contains(&fps) {
            return Err(CapabilityError::UnsupportedSelection(format!(
                "{} fps is not offered",
                fps
            )));
        }
        self.store.set(PrefKey::FrameRate(options.role), fps.into())?;
        Ok(self.resolve(options.role).configuration)
    }

    pub fn set_zoom(&mut self, zoom: f32) -> Result<EffectiveConfiguration> {
        let options = self.options(self.current_role());
        let step = options
            .zoom_steps
            .iter()
            .copied()
            .find(|s| (s - zoom).abs() < ZOOM_MATCH_TOLERANCE)
            .ok_or_else(|| {
                CapabilityError::UnsupportedSelection(format!("zoom {}x is not offered", zoom))
            })?;
        self.store.set(PrefKey::Zoom(options.role), PrefValue::from(step))?;
        Ok(self.resolve(options.role).configuration)
    }

    pub fn set_codec(&mut self, codec: CodecOption) -> Result<EffectiveConfiguration> {
        if !self.engine.supported_codecs().contains(&codec) {
            return Err(CapabilityError::UnsupportedSelection(format!(
                "codec {} has no encoder on this device",
                codec.display_name()
            )));
        }
        self.store.set(PrefKey::Codec, codec.as_str().into())?;
        Ok(self.current_configuration())
    }

    pub fn set_bitrate_auto(&mut self) -> Result<EffectiveConfiguration> {
        self.store.set(PrefKey::BitrateCustomFlag, false.into())?;
        Ok(self.current_configuration())
    }

    /// Store a custom bitrate, clamped into the accepted range.
    pub fn set_bitrate_custom(&mut self, kbps: u32) -> Result<EffectiveConfiguration> {
        let clamped = capabilities::clamp_custom(kbps, &self.engine.config().bitrate);
        if clamped != kbps {
            log::info!("Custom bitrate {} kbps clamped to {} kbps", kbps, clamped);
        }
        self.store.set(PrefKey::BitrateCustomFlag, true.into())?;
        self.store.set(PrefKey::BitrateCustomKbps, clamped.into())?;
        Ok(self.current_configuration())
    }

    fn write_all(&mut self, writes: PreferenceWrites) -> Result<()> {
        let staged = writes.len();
        let applied = writes.apply(&mut self.store);
        if applied != staged {
            return Err(CapabilityError::PreferenceStore(format!(
                "only {} of {} preference writes succeeded",
                applied, staged
            )));
        }
        Ok(())
    }
}
