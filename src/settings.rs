use std::sync::RwLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TemperatureUnit {
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub display_name: String,
    pub notifications_enabled: bool,
    pub dark_mode_enabled: bool,
    pub temperature_unit: TemperatureUnit,
    pub sound_effects_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            display_name: "John Doe".into(),
            notifications_enabled: true,
            dark_mode_enabled: false,
            temperature_unit: TemperatureUnit::Celsius,
            sound_effects_enabled: true,
        }
    }
}

/// App preferences. In-memory only; nothing survives a restart.
#[derive(Default)]
pub struct PreferencesStore {
    data: RwLock<Preferences>,
}

impl PreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Preferences {
        self.data.read().unwrap().clone()
    }

    pub fn update(&self, apply: impl FnOnce(&mut Preferences)) -> Preferences {
        let mut guard = self.data.write().unwrap();
        apply(&mut guard);
        guard.clone()
    }
}
