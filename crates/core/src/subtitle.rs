//! Subtitle entry model and the edit payloads sent for it.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// A single timed subtitle line, as returned by the entries endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    pub id: DbId,
    #[serde(rename = "project")]
    pub project_id: DbId,
    #[serde(default)]
    pub project_name: Option<String>,
    /// Seconds from the start of the video.
    pub start_time: f64,
    /// Seconds from the start of the video. Expected to exceed `start_time`;
    /// the server enforces it, this side does not.
    pub end_time: f64,
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Recognition confidence in `[0, 1]`, absent for hand-written lines.
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub is_edited: bool,
    #[serde(default)]
    pub formatted_start_time: Option<String>,
    #[serde(default)]
    pub formatted_end_time: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl SubtitleEntry {
    /// Length of the line in seconds, preferring the server's figure.
    pub fn duration(&self) -> f64 {
        self.duration.unwrap_or(self.end_time - self.start_time)
    }

    pub fn formatted_start(&self) -> String {
        self.formatted_start_time
            .clone()
            .unwrap_or_else(|| format_timestamp(self.start_time))
    }

    pub fn formatted_end(&self) -> String {
        self.formatted_end_time
            .clone()
            .unwrap_or_else(|| format_timestamp(self.end_time))
    }
}

fn default_language() -> String {
    "en".to_string()
}

/// Format seconds as `HH:MM:SS`, truncating fractional seconds.
///
/// Negative and non-finite inputs clamp to `00:00:00`.
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Partial update for `PATCH /api/subtitle/entries/{id}/`.
///
/// Only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl SubtitleEntryPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn timing(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_time.is_none()
            && self.end_time.is_none()
            && self.text.is_none()
            && self.language.is_none()
    }
}

/// Body of `POST /api/subtitle/entries/{id}/split/`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRequest {
    /// Split point in seconds.
    pub split_time: f64,
}

/// Response of a split: the shortened original and the new tail entry.
///
/// The service names the fields `original_subtitle` / `new_subtitle`; older
/// deployments used `original_entry` / `new_entry`. Both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitResult {
    #[serde(alias = "original_subtitle")]
    pub original_entry: SubtitleEntry,
    #[serde(alias = "new_subtitle")]
    pub new_entry: SubtitleEntry,
}
