//! Derived views over store collections.
//!
//! Plain functions, recomputed on every call. Linear scans are fine at the
//! sizes a single editor session holds.

use subtitler_core::project::Project;
use subtitler_core::subtitle::SubtitleEntry;
use subtitler_core::types::DbId;

pub fn completed_projects(projects: &[Project]) -> Vec<&Project> {
    projects.iter().filter(|p| p.is_completed()).collect()
}

pub fn processing_projects(projects: &[Project]) -> Vec<&Project> {
    projects.iter().filter(|p| p.is_processing()).collect()
}

pub fn project_by_id(projects: &[Project], id: DbId) -> Option<&Project> {
    projects.iter().find(|p| p.id == id)
}

pub fn subtitles_by_project(entries: &[SubtitleEntry], project_id: DbId) -> Vec<&SubtitleEntry> {
    entries.iter().filter(|e| e.project_id == project_id).collect()
}
