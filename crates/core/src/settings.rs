//! User-level application settings document.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::theme::DEFAULT_THEME_ID;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub language: String,
    pub theme: String,
    pub dev_mode: bool,
    pub notifications: bool,
    pub auto_save: bool,
    pub compact_mode: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            theme: DEFAULT_THEME_ID.to_string(),
            dev_mode: false,
            notifications: true,
            auto_save: true,
            compact_mode: false,
        }
    }
}

impl AppSettings {
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a settings document, filling absent keys from the defaults.
    ///
    /// The document must be a JSON object; unknown keys are ignored and a
    /// known key with the wrong type is an error.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let imported: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(overrides) = imported else {
            return Err(CoreError::Validation(
                "settings document must be a JSON object".into(),
            ));
        };

        let mut merged = serde_json::Map::new();
        if let serde_json::Value::Object(defaults) = serde_json::to_value(Self::default())? {
            merged = defaults;
        }
        merged.extend(overrides);

        Ok(serde_json::from_value(serde_json::Value::Object(merged))?)
    }
}
