//! The collections held by the store.

use subtitler_core::export::SubtitleExport;
use subtitler_core::project::Project;
use subtitler_core::style::SubtitleStyle;
use subtitler_core::subtitle::SubtitleEntry;
use subtitler_core::types::DbId;

use crate::selectors;

/// A point-in-time copy of everything the store holds.
///
/// Collections keep the order the service returned them in, except that
/// freshly uploaded projects are placed first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub projects: Vec<Project>,
    pub current_project: Option<Project>,
    /// Entries of the most recently loaded project.
    pub subtitles: Vec<SubtitleEntry>,
    pub styles: Vec<SubtitleStyle>,
    pub exports: Vec<SubtitleExport>,
    /// Message of the most recent failure; each new failure overwrites it.
    pub error: Option<String>,
}

impl StoreState {
    pub fn completed_projects(&self) -> Vec<&Project> {
        selectors::completed_projects(&self.projects)
    }

    pub fn processing_projects(&self) -> Vec<&Project> {
        selectors::processing_projects(&self.projects)
    }

    pub fn project_by_id(&self, id: DbId) -> Option<&Project> {
        selectors::project_by_id(&self.projects, id)
    }

    pub fn subtitles_by_project(&self, project_id: DbId) -> Vec<&SubtitleEntry> {
        selectors::subtitles_by_project(&self.subtitles, project_id)
    }
}
