//! Persisted application settings.

use subtitler_core::error::CoreError;
use subtitler_core::settings::AppSettings;

use crate::storage::KeyValueStorage;

pub const SETTINGS_KEY: &str = "app-settings";

pub struct SettingsStore<S> {
    storage: S,
    settings: AppSettings,
}

impl<S: KeyValueStorage> SettingsStore<S> {
    /// Load saved settings over the defaults. An unreadable document is
    /// logged and the defaults are used.
    pub fn new(storage: S) -> Self {
        let settings = match storage.get(SETTINGS_KEY) {
            Ok(Some(json)) => AppSettings::from_json(&json).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Ignoring unreadable saved settings");
                AppSettings::default()
            }),
            Ok(None) => AppSettings::default(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load settings");
                AppSettings::default()
            }
        };
        Self { storage, settings }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Edit settings in place and persist the result.
    pub fn update(&mut self, edit: impl FnOnce(&mut AppSettings)) -> &AppSettings {
        edit(&mut self.settings);
        self.save();
        &self.settings
    }

    pub fn reset(&mut self) {
        self.settings = AppSettings::default();
        self.save();
    }

    /// Flip developer mode, returning the new value.
    pub fn toggle_dev_mode(&mut self) -> bool {
        self.update(|s| s.dev_mode = !s.dev_mode).dev_mode
    }

    pub fn export(&self) -> Result<String, CoreError> {
        self.settings.to_json()
    }

    /// Replace settings with an exported document, overlaid on the
    /// defaults. On error the current settings are kept.
    pub fn import(&mut self, json: &str) -> Result<&AppSettings, CoreError> {
        self.settings = AppSettings::from_json(json)?;
        self.save();
        Ok(&self.settings)
    }

    fn save(&self) {
        let result = self
            .settings
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| self.storage.set(SETTINGS_KEY, &json).map_err(|e| e.to_string()));
        if let Err(error) = result {
            tracing::error!(%error, "Failed to save settings");
        }
    }
}
