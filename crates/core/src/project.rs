//! Subtitle project model and status report.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Lifecycle state of a project's upload and transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl ProjectStatus {
    /// Uploading and processing both count as "still working".
    pub fn is_processing(self) -> bool {
        matches!(self, Self::Uploading | Self::Processing)
    }

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uploading => "uploading",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// A project as returned by `/api/subtitle/projects/`.
///
/// The server also sends `is_processing` / `is_completed` booleans. They are
/// not stored: [`Project::is_processing`] and [`Project::is_completed`] are
/// computed from `status` so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_file: Option<String>,
    #[serde(default)]
    pub video_duration: Option<f64>,
    #[serde(default)]
    pub video_size: Option<i64>,
    pub status: ProjectStatus,
    #[serde(default = "default_language")]
    pub language: String,
    /// Server-side count; may lag behind the locally loaded entries.
    #[serde(default)]
    pub subtitle_count: i64,
    #[serde(default)]
    pub user: Option<String>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Project {
    pub fn is_processing(&self) -> bool {
        self.status.is_processing()
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Fold a polled status report into this project.
    ///
    /// Returns `true` when the status changed.
    pub fn apply_status(&mut self, report: &ProjectStatusReport) -> bool {
        let changed = self.status != report.status;
        self.status = report.status;
        self.subtitle_count = report.subtitle_count;
        changed
    }
}

fn default_language() -> String {
    "en".to_string()
}

/// Response of `GET /api/subtitle/projects/{id}/status/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatusReport {
    pub id: DbId,
    pub status: ProjectStatus,
    #[serde(default)]
    pub subtitle_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(status: &str) -> serde_json::Value {
        serde_json::json!({
            "id": 7,
            "name": "Interview",
            "description": "",
            "video_file": "videos/interview.mp4",
            "video_duration": 93.5,
            "video_size": 1048576,
            "status": status,
            "language": "en",
            "subtitle_count": 12,
            "is_processing": false,
            "is_completed": true,
            "user": "dev",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:05:00Z"
        })
    }

    #[test]
    fn derived_flags_follow_status() {
        assert!(ProjectStatus::Uploading.is_processing());
        assert!(ProjectStatus::Processing.is_processing());
        assert!(!ProjectStatus::Completed.is_processing());
        assert!(!ProjectStatus::Failed.is_processing());
        assert!(ProjectStatus::Completed.is_completed());
        assert!(!ProjectStatus::Failed.is_completed());
    }

    #[test]
    fn server_booleans_do_not_override_status() {
        // Server claims completed, but status says processing.
        let project: Project = serde_json::from_value(sample_json("processing")).unwrap();
        assert!(project.is_processing());
        assert!(!project.is_completed());
    }

    #[test]
    fn list_serializer_shape_deserializes() {
        let project: Project = serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "Short",
            "description": "clip",
            "status": "completed",
            "subtitle_count": 4,
            "language": "de",
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(project.id, 3);
        assert!(project.video_file.is_none());
        assert!(project.updated_at.is_none());
        assert_eq!(project.language, "de");
    }

    #[test]
    fn apply_status_reports_change() {
        let mut project: Project = serde_json::from_value(sample_json("processing")).unwrap();
        let report = ProjectStatusReport {
            id: 7,
            status: ProjectStatus::Completed,
            subtitle_count: 40,
        };
        assert!(project.apply_status(&report));
        assert_eq!(project.subtitle_count, 40);
        assert!(!project.apply_status(&report));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = serde_json::from_value::<Project>(sample_json("archived"));
        assert!(result.is_err());
    }
}
