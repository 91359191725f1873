//! Export records and the export / embed request payloads.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Output format of an export artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Srt,
    Vtt,
    Ass,
    Txt,
    /// A video file with subtitles burned in.
    EmbeddedVideo,
    /// Any format this client does not know about yet.
    #[serde(other)]
    Other,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Ass => "ass",
            Self::Txt => "txt",
            Self::EmbeddedVideo => "embedded_video",
            Self::Other => "other",
        }
    }
}

/// A generated artifact, as listed by `/api/subtitle/exports/`.
///
/// Created by export / embed requests; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleExport {
    pub id: DbId,
    #[serde(rename = "project")]
    pub project_id: DbId,
    #[serde(default)]
    pub project_name: Option<String>,
    pub format: ExportFormat,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default, rename = "style")]
    pub style_id: Option<DbId>,
    #[serde(default)]
    pub style_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Body of `POST /api/subtitle/projects/{id}/export/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    #[serde(default)]
    pub style_id: Option<DbId>,
}

/// Body of `POST /api/subtitle/projects/{id}/embed_subtitles/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedOptions {
    pub style: String,
    pub font_size: u32,
    pub font_color: String,
    pub outline_color: String,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            style: "default".to_string(),
            font_size: 24,
            font_color: "white".to_string(),
            outline_color: "black".to_string(),
        }
    }
}

/// Response of an embed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedResult {
    pub success: bool,
    #[serde(default)]
    pub export_id: Option<DbId>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub message: String,
}
