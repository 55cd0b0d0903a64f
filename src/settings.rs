//! Performer preferences: tempo, timbre, telemetry endpoints
//!
//! Persisted as JSON: LocalStorage on the web, an optional file natively.

use serde::{Deserialize, Serialize};

use crate::audio::Waveform;
use crate::consts::DEFAULT_BPM;

/// Engine settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sequencer tempo in beats per minute
    pub bpm: f32,
    /// Oscillator timbre for every note
    pub synth_type: Waveform,
    /// Session event endpoint
    pub telemetry_url: String,
    /// Session summary endpoint
    pub session_end_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            synth_type: Waveform::Triangle,
            telemetry_url: "/api/sessions/event".to_string(),
            session_end_url: "/api/sessions/end".to_string(),
        }
    }
}

impl Settings {
    /// Set tempo; non-finite or non-positive values are rejected
    pub fn set_bpm(&mut self, bpm: f32) -> bool {
        if !bpm.is_finite() || bpm <= 0.0 {
            log::warn!("Ignoring invalid tempo {bpm}");
            return false;
        }
        self.bpm = bpm;
        true
    }

    /// Parse settings JSON, sanitizing the tempo
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        let bpm = settings.bpm;
        if !settings.set_bpm(bpm) {
            settings.bpm = DEFAULT_BPM;
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "synth_orbit_settings";

    /// Environment variable naming a native settings file
    pub const PATH_ENV: &'static str = "SYNTH_ORBIT_SETTINGS";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load from the file named by `SYNTH_ORBIT_SETTINGS`, else defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(Self::PATH_ENV) else {
            return Self::default();
        };
        match Self::load_file(std::path::Path::new(&path)) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.to_string_lossy());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings: {e:#}");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing {}", path.display()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
