//! Store operations, as named in logs and in the shared error slot.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchProjects,
    FetchProject,
    UploadVideo,
    RefreshProjectStatus,
    FetchSubtitles,
    UpdateSubtitle,
    DeleteSubtitle,
    SplitSubtitle,
    MergeSubtitle,
    FetchStyles,
    ExportSubtitles,
    EmbedSubtitles,
    FetchExports,
    DeleteProject,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchProjects => "fetch_projects",
            Self::FetchProject => "fetch_project",
            Self::UploadVideo => "upload_video",
            Self::RefreshProjectStatus => "refresh_project_status",
            Self::FetchSubtitles => "fetch_subtitles",
            Self::UpdateSubtitle => "update_subtitle",
            Self::DeleteSubtitle => "delete_subtitle",
            Self::SplitSubtitle => "split_subtitle",
            Self::MergeSubtitle => "merge_subtitle",
            Self::FetchStyles => "fetch_styles",
            Self::ExportSubtitles => "export_subtitles",
            Self::EmbedSubtitles => "embed_subtitles",
            Self::FetchExports => "fetch_exports",
            Self::DeleteProject => "delete_project",
        }
    }

    /// Message written to the shared error slot when this operation fails.
    ///
    /// Status polling runs in the background and never writes the slot.
    pub fn failure_message(self) -> Option<&'static str> {
        let message = match self {
            Self::FetchProjects => "Failed to fetch projects",
            Self::FetchProject => "Failed to fetch project",
            Self::UploadVideo => "Failed to upload video",
            Self::RefreshProjectStatus => return None,
            Self::FetchSubtitles => "Failed to fetch subtitles",
            Self::UpdateSubtitle => "Failed to update subtitle",
            Self::DeleteSubtitle => "Failed to delete subtitle",
            Self::SplitSubtitle => "Failed to split subtitle",
            Self::MergeSubtitle => "Failed to merge subtitle",
            Self::FetchStyles => "Failed to fetch styles",
            Self::ExportSubtitles => "Failed to export subtitles",
            Self::EmbedSubtitles => "Failed to embed subtitles",
            Self::FetchExports => "Failed to fetch exports",
            Self::DeleteProject => "Failed to delete project",
        };
        Some(message)
    }

    /// Whether the operation drives the loading indicator and clears the
    /// error slot when it starts.
    pub fn tracks_loading(self) -> bool {
        matches!(self, Self::FetchProjects | Self::FetchProject | Self::UploadVideo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_operations() {
        assert!(Operation::FetchProjects.tracks_loading());
        assert!(Operation::UploadVideo.tracks_loading());
        assert!(!Operation::FetchSubtitles.tracks_loading());
        assert!(!Operation::DeleteProject.tracks_loading());
    }

    #[test]
    fn status_polling_has_no_user_facing_message() {
        assert_eq!(Operation::RefreshProjectStatus.failure_message(), None);
        assert_eq!(
            Operation::SplitSubtitle.failure_message(),
            Some("Failed to split subtitle")
        );
    }
}
