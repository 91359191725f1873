//! UI theme documents.
//!
//! Themes are exchanged as JSON documents (the same camelCase shape the web
//! front end stores), so export followed by import reproduces every field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Id of the theme selected when nothing has been persisted yet.
pub const DEFAULT_THEME_ID: &str = "luxury-light";

/// Named palette slots every theme must define.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub dark: String,
    pub dark_page: String,
    pub positive: String,
    pub negative: String,
    pub info: String,
    pub warning: String,
}

impl ThemeColors {
    /// `(slot, value)` pairs in declaration order, with the slot spelled the
    /// way CSS variables name it.
    pub fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("accent", &self.accent),
            ("dark", &self.dark),
            ("dark-page", &self.dark_page),
            ("positive", &self.positive),
            ("negative", &self.negative),
            ("info", &self.info),
            ("warning", &self.warning),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub is_dark: bool,
    pub colors: ThemeColors,
    /// Extra design tokens (surfaces, gradients, radii, shadows).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<BTreeMap<String, String>>,
}

impl Theme {
    /// Pretty-printed JSON document for sharing.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a shared theme document.
    ///
    /// A document must carry a non-empty `id` and `name`, a full `colors`
    /// block and a `custom` map.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let theme: Theme = serde_json::from_str(json)?;
        if theme.id.trim().is_empty() {
            return Err(CoreError::Validation("theme id must not be empty".into()));
        }
        if theme.name.trim().is_empty() {
            return Err(CoreError::Validation("theme name must not be empty".into()));
        }
        if theme.custom.is_none() {
            return Err(CoreError::Validation("theme custom tokens are required".into()));
        }
        Ok(theme)
    }

    /// CSS custom properties to apply for this theme: `--q-<slot>` for the
    /// palette, `--<token>` for custom tokens.
    pub fn css_variables(&self) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = self
            .colors
            .entries()
            .iter()
            .map(|(slot, value)| (format!("--q-{slot}"), (*value).to_string()))
            .collect();
        if let Some(custom) = &self.custom {
            vars.extend(
                custom
                    .iter()
                    .map(|(key, value)| (format!("--{key}"), value.clone())),
            );
        }
        vars
    }
}

fn tokens(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
    )
}

/// Themes shipped with the application.
pub fn builtin_themes() -> Vec<Theme> {
    vec![
        Theme {
            id: DEFAULT_THEME_ID.to_string(),
            name: "Luxury Light".to_string(),
            is_dark: false,
            colors: ThemeColors {
                primary: "#1e293b".into(),
                secondary: "#334155".into(),
                accent: "#0f172a".into(),
                dark: "#1e293b".into(),
                dark_page: "#fafafa".into(),
                positive: "#059669".into(),
                negative: "#dc2626".into(),
                info: "#2563eb".into(),
                warning: "#d97706".into(),
            },
            custom: tokens(&[
                ("surface", "#ffffff"),
                ("surface-variant", "#f8fafc"),
                ("on-surface", "#0f172a"),
                ("outline", "#e2e8f0"),
                ("border-radius", "16px"),
                ("shadow-sm", "0 2px 4px 0 rgba(0, 0, 0, 0.06)"),
            ]),
        },
        Theme {
            id: "luxury-dark".to_string(),
            name: "Luxury Dark".to_string(),
            is_dark: true,
            colors: ThemeColors {
                primary: "#fbbf24".into(),
                secondary: "#f59e0b".into(),
                accent: "#d97706".into(),
                dark: "#0f172a".into(),
                dark_page: "#020617".into(),
                positive: "#10b981".into(),
                negative: "#ef4444".into(),
                info: "#3b82f6".into(),
                warning: "#f59e0b".into(),
            },
            custom: tokens(&[
                ("surface", "#1e293b"),
                ("surface-variant", "#334155"),
                ("on-surface", "#f8fafc"),
                ("outline", "#475569"),
                ("border-radius", "16px"),
                ("shadow-sm", "0 2px 4px 0 rgba(0, 0, 0, 0.4)"),
            ]),
        },
        Theme {
            id: "premium-dark".to_string(),
            name: "Premium Dark".to_string(),
            is_dark: true,
            colors: ThemeColors {
                primary: "#6366f1".into(),
                secondary: "#8b5cf6".into(),
                accent: "#06b6d4".into(),
                dark: "#0f172a".into(),
                dark_page: "#020617".into(),
                positive: "#10b981".into(),
                negative: "#ef4444".into(),
                info: "#3b82f6".into(),
                warning: "#f59e0b".into(),
            },
            custom: tokens(&[
                ("surface", "#1e293b"),
                ("surface-variant", "#334155"),
                ("on-surface", "#f1f5f9"),
                ("outline", "#475569"),
                ("border-radius", "12px"),
                ("shadow-sm", "0 1px 2px 0 rgba(0, 0, 0, 0.3)"),
            ]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn export_then_import_reproduces_every_field() {
        for theme in builtin_themes() {
            let json = theme.to_json().unwrap();
            let back = Theme::from_json(&json).unwrap();
            assert_eq!(back, theme);
        }
    }

    #[test]
    fn exported_document_uses_camel_case() {
        let theme = &builtin_themes()[0];
        let value: serde_json::Value = serde_json::from_str(&theme.to_json().unwrap()).unwrap();
        assert_eq!(value["isDark"], false);
        assert_eq!(value["colors"]["darkPage"], "#fafafa");
    }

    #[test]
    fn import_requires_custom_tokens() {
        let mut theme = builtin_themes().remove(0);
        theme.custom = None;
        let json = serde_json::to_string(&theme).unwrap();
        assert_matches!(Theme::from_json(&json), Err(CoreError::Validation(_)));
    }

    #[test]
    fn import_rejects_blank_name_and_garbage() {
        let mut theme = builtin_themes().remove(0);
        theme.name = "  ".into();
        let json = serde_json::to_string(&theme).unwrap();
        assert_matches!(Theme::from_json(&json), Err(CoreError::Validation(_)));
        assert_matches!(Theme::from_json("{not json"), Err(CoreError::Json(_)));
        assert_matches!(Theme::from_json(r#"{"id":"x","name":"y"}"#), Err(CoreError::Json(_)));
    }

    #[test]
    fn css_variables_cover_palette_and_tokens() {
        let theme = &builtin_themes()[0];
        let vars = theme.css_variables();
        assert!(vars.contains(&("--q-primary".to_string(), "#1e293b".to_string())));
        assert!(vars.contains(&("--q-dark-page".to_string(), "#fafafa".to_string())));
        assert!(vars.contains(&("--surface".to_string(), "#ffffff".to_string())));
        assert_eq!(vars.len(), 9 + theme.custom.as_ref().unwrap().len());
    }

    #[test]
    fn builtins_have_unique_ids_and_include_default() {
        let themes = builtin_themes();
        let mut ids: Vec<_> = themes.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), themes.len());
        assert!(themes.iter().any(|t| t.id == DEFAULT_THEME_ID));
        assert!(themes.iter().any(|t| t.is_dark));
    }
}
