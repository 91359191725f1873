//! The theme collection and the selected theme.
//!
//! The theme list is persisted under [`THEMES_KEY`] as a JSON array and the
//! selected id under [`CURRENT_THEME_KEY`] as a plain string. Persistence
//! failures are logged and never fail an operation: the in-memory state
//! stays authoritative for the session.

use subtitler_core::error::CoreError;
use subtitler_core::theme::{builtin_themes, Theme};
use uuid::Uuid;

use crate::storage::KeyValueStorage;

pub const CURRENT_THEME_KEY: &str = "current-theme";
pub const THEMES_KEY: &str = "themes";

pub struct ThemeStore<S> {
    storage: S,
    themes: Vec<Theme>,
    current_id: String,
}

impl<S: KeyValueStorage> ThemeStore<S> {
    /// Load persisted themes and selection, falling back to the built-in
    /// themes and the first of them.
    pub fn new(storage: S) -> Self {
        let themes = load_themes(&storage).unwrap_or_else(builtin_themes);
        let current_id = match storage.get(CURRENT_THEME_KEY) {
            Ok(Some(id)) if themes.iter().any(|t| t.id == id) => id,
            Ok(_) => themes.first().map(|t| t.id.clone()).unwrap_or_default(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load current theme");
                themes.first().map(|t| t.id.clone()).unwrap_or_default()
            }
        };
        Self {
            storage,
            themes,
            current_id,
        }
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn current_theme_id(&self) -> &str {
        &self.current_id
    }

    /// The selected theme, or the first theme if the selection vanished.
    pub fn current_theme(&self) -> Option<&Theme> {
        self.find(&self.current_id).or_else(|| self.themes.first())
    }

    pub fn theme(&self, id: &str) -> Option<&Theme> {
        self.find(id)
    }

    /// CSS custom properties of the selected theme.
    pub fn css_variables(&self) -> Vec<(String, String)> {
        self.current_theme()
            .map(Theme::css_variables)
            .unwrap_or_default()
    }

    pub fn set_theme(&mut self, id: &str) -> Result<&Theme, CoreError> {
        let index = self.index_of(id)?;
        self.current_id = id.to_string();
        self.save_current();
        tracing::info!(theme_id = id, "Theme selected");
        Ok(&self.themes[index])
    }

    pub fn add_theme(&mut self, theme: Theme) -> Result<(), CoreError> {
        if self.find(&theme.id).is_some() {
            return Err(CoreError::Conflict(format!(
                "theme {} already exists",
                theme.id
            )));
        }
        self.themes.push(theme);
        self.save_themes();
        Ok(())
    }

    /// Remove a theme. The last remaining theme cannot be removed; removing
    /// the selected theme selects the first remaining one.
    pub fn remove_theme(&mut self, id: &str) -> Result<Theme, CoreError> {
        let index = self.index_of(id)?;
        if self.themes.len() <= 1 {
            return Err(CoreError::Conflict("cannot remove the last theme".into()));
        }
        let removed = self.themes.remove(index);
        if self.current_id == id {
            if let Some(first) = self.themes.first() {
                self.current_id = first.id.clone();
                self.save_current();
            }
        }
        self.save_themes();
        Ok(removed)
    }

    /// Replace the theme with the same id.
    pub fn update_theme(&mut self, theme: Theme) -> Result<(), CoreError> {
        let index = self.index_of(&theme.id)?;
        self.themes[index] = theme;
        self.save_themes();
        Ok(())
    }

    /// Create a theme named `name`, copying colors and custom tokens from the
    /// first theme with the same darkness.
    pub fn create_theme(&mut self, name: &str, is_dark: bool) -> Result<Theme, CoreError> {
        let base = self
            .themes
            .iter()
            .find(|t| t.is_dark == is_dark)
            .or_else(|| self.themes.first())
            .ok_or_else(|| CoreError::NotFound {
                entity: "base theme",
                id: if is_dark { "dark" } else { "light" }.to_string(),
            })?;
        let theme = Theme {
            id: new_theme_id("custom"),
            name: name.to_string(),
            is_dark,
            colors: base.colors.clone(),
            custom: base.custom.clone(),
        };
        self.add_theme(theme.clone())?;
        Ok(theme)
    }

    pub fn duplicate_theme(&mut self, id: &str) -> Result<Theme, CoreError> {
        let source = &self.themes[self.index_of(id)?];
        let theme = Theme {
            id: new_theme_id("custom"),
            name: format!("{} (Copy)", source.name),
            ..source.clone()
        };
        self.add_theme(theme.clone())?;
        Ok(theme)
    }

    pub fn export_theme(&self, id: &str) -> Result<String, CoreError> {
        self.themes[self.index_of(id)?].to_json()
    }

    /// Import a shared theme document under a fresh id.
    pub fn import_theme(&mut self, json: &str) -> Result<Theme, CoreError> {
        let mut theme = Theme::from_json(json)?;
        theme.id = new_theme_id("imported");
        self.add_theme(theme.clone())?;
        tracing::info!(theme_id = %theme.id, name = %theme.name, "Theme imported");
        Ok(theme)
    }

    // ---- private helpers ----

    fn find(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == id)
    }

    fn index_of(&self, id: &str) -> Result<usize, CoreError> {
        self.themes
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "theme",
                id: id.to_string(),
            })
    }

    fn save_current(&self) {
        if let Err(e) = self.storage.set(CURRENT_THEME_KEY, &self.current_id) {
            tracing::error!(error = %e, "Failed to save current theme");
        }
    }

    fn save_themes(&self) {
        let result = serde_json::to_string(&self.themes)
            .map_err(|e| e.to_string())
            .and_then(|json| self.storage.set(THEMES_KEY, &json).map_err(|e| e.to_string()));
        if let Err(error) = result {
            tracing::error!(%error, "Failed to save themes");
        }
    }
}

/// Persisted themes, if a non-empty valid list was saved.
fn load_themes<S: KeyValueStorage>(storage: &S) -> Option<Vec<Theme>> {
    let raw = match storage.get(THEMES_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load themes");
            return None;
        }
    };
    match serde_json::from_str::<Vec<Theme>>(&raw) {
        Ok(themes) if !themes.is_empty() => Some(themes),
        Ok(_) => None,
        Err(e) => {
            tracing::error!(error = %e, "Ignoring unreadable saved themes");
            None
        }
    }
}

fn new_theme_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use subtitler_core::theme::DEFAULT_THEME_ID;

    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> ThemeStore<MemoryStorage> {
        ThemeStore::new(MemoryStorage::new())
    }

    #[test]
    fn starts_with_builtin_themes() {
        let themes = store();
        assert_eq!(themes.themes().len(), builtin_themes().len());
        assert_eq!(themes.current_theme_id(), DEFAULT_THEME_ID);
    }

    #[test]
    fn set_theme_persists_selection() {
        let mut themes = store();
        themes.set_theme("luxury-dark").unwrap();
        assert_eq!(
            themes.storage.get(CURRENT_THEME_KEY).unwrap().as_deref(),
            Some("luxury-dark")
        );
        assert_matches!(themes.set_theme("nope"), Err(CoreError::NotFound { .. }));
        assert_eq!(themes.current_theme_id(), "luxury-dark");
    }

    #[test]
    fn unknown_saved_selection_falls_back_to_first() {
        let storage = MemoryStorage::new();
        storage.set(CURRENT_THEME_KEY, "deleted-theme").unwrap();
        let themes = ThemeStore::new(storage);
        assert_eq!(themes.current_theme_id(), DEFAULT_THEME_ID);
    }

    #[test]
    fn removing_current_switches_to_first() {
        let mut themes = store();
        themes.set_theme("premium-dark").unwrap();
        themes.remove_theme("premium-dark").unwrap();

        assert_eq!(themes.current_theme_id(), themes.themes()[0].id);
        assert!(themes.theme("premium-dark").is_none());
    }

    #[test]
    fn last_theme_cannot_be_removed() {
        let mut themes = store();
        let ids: Vec<String> = themes.themes().iter().map(|t| t.id.clone()).collect();
        for id in &ids[1..] {
            themes.remove_theme(id).unwrap();
        }
        assert_matches!(themes.remove_theme(&ids[0]), Err(CoreError::Conflict(_)));
        assert_eq!(themes.themes().len(), 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut themes = store();
        let existing = themes.themes()[0].clone();
        assert_matches!(themes.add_theme(existing), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn create_copies_base_with_same_darkness() {
        let mut themes = store();
        let dark_base = themes.themes().iter().find(|t| t.is_dark).cloned().unwrap();

        let created = themes.create_theme("Night", true).unwrap();

        assert!(created.id.starts_with("custom-"));
        assert_eq!(created.colors, dark_base.colors);
        assert_eq!(created.custom, dark_base.custom);
        assert!(themes.theme(&created.id).is_some());
    }

    #[test]
    fn duplicate_appends_copy_suffix() {
        let mut themes = store();
        let copy = themes.duplicate_theme(DEFAULT_THEME_ID).unwrap();
        assert_eq!(copy.name, "Luxury Light (Copy)");
        assert_ne!(copy.id, DEFAULT_THEME_ID);
    }

    #[test]
    fn import_assigns_fresh_id() {
        let mut themes = store();
        let json = themes.export_theme("luxury-dark").unwrap();

        let imported = themes.import_theme(&json).unwrap();

        assert!(imported.id.starts_with("imported-"));
        let original = themes.theme("luxury-dark").unwrap();
        assert_eq!(imported.colors, original.colors);
        assert_eq!(imported.custom, original.custom);
    }

    #[test]
    fn theme_list_survives_reload() {
        let storage = std::sync::Arc::new(MemoryStorage::new());
        let mut themes = ThemeStore::new(std::sync::Arc::clone(&storage));
        let created = themes.create_theme("Mine", false).unwrap();
        themes.set_theme(&created.id).unwrap();

        let reloaded = ThemeStore::new(storage);
        assert_eq!(reloaded.current_theme_id(), created.id);
        assert_eq!(reloaded.theme(&created.id), Some(&created));
    }

    #[test]
    fn css_variables_follow_current_theme() {
        let mut themes = store();
        themes.set_theme("luxury-dark").unwrap();
        let vars = themes.css_variables();
        let dark = themes.theme("luxury-dark").unwrap();
        assert!(vars.contains(&("--q-primary".to_string(), dark.colors.primary.clone())));
    }
}
