//! Subtitle style reference data.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// A named presentation template applied when exporting or embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleStyle {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub css_class: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

fn default_active() -> bool {
    true
}
