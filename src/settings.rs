//! Runtime settings
//!
//! Simulation tunables plus player preferences. Persisted separately from
//! progress in LocalStorage; missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation ===
    /// Longest frame delta fed to the simulation (seconds)
    pub max_frame_dt: f32,
    /// Chassis top below this y counts as a flip (screen space, y down).
    /// Tuned for the 400px terrain baseline.
    pub flip_floor_y: f32,
    /// Distance from the chassis center at which sensors trigger
    pub pickup_radius: f32,
    /// Fuel fraction under which the HUD shows the low-fuel warning
    pub low_fuel_fraction: f32,
    /// Internal solver substeps per physics tick
    pub physics_substeps: u32,

    // === Camera ===
    pub camera_follow_x: f32,
    pub camera_follow_y: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0), on top of the master volume
    pub sfx_volume: f32,
    /// Silence audio while the window is out of focus
    pub mute_on_blur: bool,

    // === Focus ===
    /// Pause a running run when the window loses focus
    pub pause_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_frame_dt: 0.05,
            flip_floor_y: 460.0,
            pickup_radius: 60.0,
            low_fuel_fraction: 0.2,
            physics_substeps: 4,

            camera_follow_x: 0.1,
            camera_follow_y: 0.05,

            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            pause_on_blur: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "hillclimb_settings";

    /// Parse settings from JSON, keeping defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Clamp a host frame delta to the simulation limit
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        dt.clamp(0.0, self.max_frame_dt)
    }

    /// Engine loop gain, 0 while muted
    pub fn engine_gain(&self, focused: bool) -> f32 {
        if !focused && self.mute_on_blur {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0)
        }
    }

    /// One-shot effect gain, 0 while muted
    pub fn sfx_gain(&self, focused: bool) -> f32 {
        self.engine_gain(focused) * self.sfx_volume.clamp(0.0, 1.0)
    }

    #[cfg(target_arch = "wasm32")]
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = Self::storage().and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten());
        match stored.as_deref().map(Self::from_json) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = Self::storage() else {
            log::warn!("LocalStorage unavailable, settings not saved");
            return;
        };
        match self.to_json() {
            Ok(json) if storage.set_item(Self::STORAGE_KEY, &json).is_ok() => {
                log::info!("Settings saved")
            }
            Ok(_) => log::warn!("Failed to write settings"),
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
