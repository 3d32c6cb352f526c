//! Preference store surface
//!
//! The engine only needs flat get/set on a key-value store. Writes produced
//! by one resolve are staged in [`PreferenceWrites`] and applied together
//! right before the resolve returns, so observers never see a half-corrected
//! configuration.

use crate::errors::{CapabilityError, Result};
use crate::types::{CameraRole, CodecOption, FrameSize, PhysicalDeviceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    CameraRole,
    SelectedLens(CameraRole),
    ResolutionWidth,
    ResolutionHeight,
    FrameRate(CameraRole),
    Zoom(CameraRole),
    Codec,
    BitrateCustomFlag,
    BitrateCustomKbps,
}

impl PrefKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefKey::CameraRole => "camera_selection",
            PrefKey::SelectedLens(CameraRole::Back) => "selected_lens_id_back",
            PrefKey::SelectedLens(CameraRole::Front) => "selected_lens_id_front",
            PrefKey::ResolutionWidth => "video_resolution_width",
            PrefKey::ResolutionHeight => "video_resolution_height",
            PrefKey::FrameRate(CameraRole::Back) => "video_frame_rate_back",
            PrefKey::FrameRate(CameraRole::Front) => "video_frame_rate_front",
            PrefKey::Zoom(CameraRole::Back) => "zoom_ratio_back",
            PrefKey::Zoom(CameraRole::Front) => "zoom_ratio_front",
            PrefKey::Codec => "video_codec",
            PrefKey::BitrateCustomFlag => "bitrate_mode_custom",
            PrefKey::BitrateCustomKbps => "bitrate_custom_value",
        }
    }
}

impl fmt::Display for PrefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PrefValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            PrefValue::Int(i) => u32::try_from(*i).ok(),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            PrefValue::Float(f) => Some(*f as f32).filter(|f| f.is_finite()),
            PrefValue::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PrefValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(b) => write!(f, "{}", b),
            PrefValue::Int(i) => write!(f, "{}", i),
            PrefValue::Float(v) => write!(f, "{}", v),
            PrefValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for PrefValue {
    fn from(b: bool) -> Self {
        PrefValue::Bool(b)
    }
}

impl From<u32> for PrefValue {
    fn from(v: u32) -> Self {
        PrefValue::Int(v as i64)
    }
}

impl From<f32> for PrefValue {
    fn from(v: f32) -> Self {
        PrefValue::Float(v as f64)
    }
}

impl From<&str> for PrefValue {
    fn from(s: &str) -> Self {
        PrefValue::Text(s.to_string())
    }
}

/// External key-value store holding the user's selections.
pub trait PreferenceStore {
    fn get(&self, key: PrefKey) -> Option<PrefValue>;

    fn set(&mut self, key: PrefKey, value: PrefValue) -> Result<()>;
}

/// Typed view of everything the resolver reads for one role.
///
/// Values that are present but malformed come back as `None`; the resolver
/// then replaces them like any other invalid value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredPreferences {
    pub role: Option<CameraRole>,
    pub lens_id: Option<PhysicalDeviceId>,
    pub resolution: Option<FrameSize>,
    pub frame_rate: Option<u32>,
    pub zoom: Option<f32>,
    pub codec: Option<CodecOption>,
    pub bitrate_custom: bool,
    pub bitrate_custom_kbps: Option<u32>,
}

impl StoredPreferences {
    pub fn load(store: &dyn PreferenceStore, role: CameraRole) -> Self {
        let role_pref = read(store, PrefKey::CameraRole, |v| {
            v.as_text().and_then(|s| s.parse::<CameraRole>().ok())
        });
        let lens_id = read(store, PrefKey::SelectedLens(role), |v| {
            v.as_text()
                .filter(|s| !s.is_empty())
                .map(PhysicalDeviceId::from)
        });
        let width = read(store, PrefKey::ResolutionWidth, PrefValue::as_u32);
        let height = read(store, PrefKey::ResolutionHeight, PrefValue::as_u32);
        let resolution = match (width, height) {
            (Some(w), Some(h)) => Some(FrameSize::new(w, h)),
            _ => None,
        };
        let frame_rate = read(store, PrefKey::FrameRate(role), PrefValue::as_u32).filter(|r| *r > 0);
        let zoom = read(store, PrefKey::Zoom(role), PrefValue::as_f32);
        let codec = read(store, PrefKey::Codec, |v| {
            v.as_text().and_then(|s| s.parse::<CodecOption>().ok())
        });
        let bitrate_custom =
            read(store, PrefKey::BitrateCustomFlag, PrefValue::as_bool).unwrap_or(false);
        let bitrate_custom_kbps = read(store, PrefKey::BitrateCustomKbps, PrefValue::as_u32);

        Self {
            role: role_pref,
            lens_id,
            resolution,
            frame_rate,
            zoom,
            codec,
            bitrate_custom,
            bitrate_custom_kbps,
        }
    }
}

fn read<T>(
    store: &dyn PreferenceStore,
    key: PrefKey,
    parse: impl Fn(&PrefValue) -> Option<T>,
) -> Option<T> {
    let raw = store.get(key)?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        let err = CapabilityError::InvalidPersistedValue {
            key: key.to_string(),
            value: raw.to_string(),
        };
        log::info!("{}", err);
    }
    parsed
}

/// Writes staged during one resolve, applied as a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceWrites {
    pending: Vec<(PrefKey, PrefValue)>,
}

impl PreferenceWrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a write, replacing any earlier staged value for the same key.
    pub fn stage(&mut self, key: PrefKey, value: PrefValue) {
        if let Some(slot) = self.pending.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.pending.push((key, value));
        }
    }

    /// Stage a write only when the store holds something different.
    pub fn stage_if_changed(
        &mut self,
        store: &dyn PreferenceStore,
        key: PrefKey,
        value: PrefValue,
    ) -> bool {
        if store.get(key).as_ref() == Some(&value) {
            return false;
        }
        self.stage(key, value);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = PrefKey> + '_ {
        self.pending.iter().map(|(k, _)| *k)
    }

    /// Apply every staged write. A failed write is logged and skipped.
    pub fn apply(self, store: &mut dyn PreferenceStore) -> usize {
        let mut applied = 0;
        for (key, value) in self.pending {
            match store.set(key, value) {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("Failed to persist {}: {}", key, e),
            }
        }
        applied
    }
}

/// In-memory store, serialisable to TOML for the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryPreferences {
    values: BTreeMap<String, PrefValue>,
    #[serde(skip)]
    write_count: usize,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total successful `set` calls since creation.
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    pub fn raw(&self, key: &str) -> Option<&PrefValue> {
        self.values.get(key)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("Preferences file not found at {:?}, starting empty", path);
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            CapabilityError::PreferenceStore(format!("Failed to parse preferences: {}", e))
        })
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            CapabilityError::PreferenceStore(format!("Failed to serialize preferences: {}", e))
        })?;
        fs::write(path.as_ref(), toml_string)?;
        Ok(())
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: PrefKey) -> Option<PrefValue> {
        self.values.get(key.as_str()).cloned()
    }

    fn set(&mut self, key: PrefKey, value: PrefValue) -> Result<()> {
        self.values.insert(key.as_str().to_string(), value);
        self.write_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_preferences_parse() {
        let mut store = MemoryPreferences::new();
        store.set(PrefKey::CameraRole, "front".into()).unwrap();
        store.set(PrefKey::ResolutionWidth, 3840u32.into()).unwrap();
        store.set(PrefKey::ResolutionHeight, 2160u32.into()).unwrap();
        store.set(PrefKey::FrameRate(CameraRole::Front), 60u32.into()).unwrap();
        store.set(PrefKey::Codec, "AVC".into()).unwrap();

        let prefs = StoredPreferences::load(&store, CameraRole::Front);
        assert_eq!(prefs.role, Some(CameraRole::Front));
        assert_eq!(prefs.resolution, Some(FrameSize::new(3840, 2160)));
        assert_eq!(prefs.frame_rate, Some(60));
        assert_eq!(prefs.codec, Some(CodecOption::Avc));
        assert!(!prefs.bitrate_custom);
    }

    #[test]
    fn test_malformed_values_read_as_missing() {
        let mut store = MemoryPreferences::new();
        store.set(PrefKey::Codec, "VP8".into()).unwrap();
        store.set(PrefKey::ResolutionWidth, PrefValue::Int(-5)).unwrap();
        store.set(PrefKey::ResolutionHeight, 1080u32.into()).unwrap();

        let prefs = StoredPreferences::load(&store, CameraRole::Back);
        assert_eq!(prefs.codec, None);
        assert_eq!(prefs.resolution, None);
    }

    #[test]
    fn test_staged_writes_skip_unchanged() {
        let mut store = MemoryPreferences::new();
        store.set(PrefKey::Codec, "HEVC".into()).unwrap();

        let mut writes = PreferenceWrites::new();
        assert!(!writes.stage_if_changed(&store, PrefKey::Codec, "HEVC".into()));
        assert!(writes.stage_if_changed(&store, PrefKey::Zoom(CameraRole::Back), 1.0f32.into()));
        writes.stage(PrefKey::Zoom(CameraRole::Back), 2.0f32.into());
        assert_eq!(writes.len(), 1);

        let before = store.write_count();
        assert_eq!(writes.apply(&mut store), 1);
        assert_eq!(store.write_count(), before + 1);
        assert_eq!(
            store.get(PrefKey::Zoom(CameraRole::Back)),
            Some(PrefValue::Float(2.0))
        );
    }

    #[test]
    fn test_memory_preferences_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");

        let mut store = MemoryPreferences::new();
        store.set(PrefKey::BitrateCustomFlag, true.into()).unwrap();
        store.set(PrefKey::BitrateCustomKbps, 25_000u32.into()).unwrap();
        store.set(PrefKey::Zoom(CameraRole::Back), 0.5f32.into()).unwrap();
        store.save_to_file(&path).unwrap();

        let loaded = MemoryPreferences::load_from_file(&path).unwrap();
        assert_eq!(loaded.get(PrefKey::BitrateCustomFlag), Some(PrefValue::Bool(true)));
        assert_eq!(loaded.get(PrefKey::BitrateCustomKbps), Some(PrefValue::Int(25_000)));
        assert_eq!(loaded.get(PrefKey::Zoom(CameraRole::Back)), Some(PrefValue::Float(0.5)));
    }
}
