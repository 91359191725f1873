//! The remote seam the store depends on.
//!
//! [`SubtitleBackend`] mirrors the typed endpoints of [`SubtitleApi`]; the
//! store never talks to `reqwest` directly. Tests substitute in-memory
//! fakes that control response timing.

use async_trait::async_trait;
use subtitler_client::{ApiError, Artifact, ProgressFn, SubtitleApi, UploadForm};
use subtitler_core::export::{EmbedOptions, EmbedResult, ExportRequest, SubtitleExport};
use subtitler_core::project::{Project, ProjectStatusReport};
use subtitler_core::style::SubtitleStyle;
use subtitler_core::subtitle::{SplitResult, SubtitleEntry, SubtitleEntryPatch};
use subtitler_core::types::DbId;

/// Remote operations used by [`SubtitleStore`](crate::SubtitleStore).
#[async_trait]
pub trait SubtitleBackend: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;

    async fn get_project(&self, id: DbId) -> Result<Project, ApiError>;

    async fn project_status(&self, id: DbId) -> Result<ProjectStatusReport, ApiError>;

    async fn upload_video(
        &self,
        form: UploadForm,
        on_progress: Option<ProgressFn>,
    ) -> Result<Project, ApiError>;

    async fn delete_project(&self, id: DbId) -> Result<(), ApiError>;

    async fn project_subtitles(&self, project_id: DbId) -> Result<Vec<SubtitleEntry>, ApiError>;

    async fn update_entry(
        &self,
        id: DbId,
        patch: &SubtitleEntryPatch,
    ) -> Result<SubtitleEntry, ApiError>;

    async fn delete_entry(&self, id: DbId) -> Result<(), ApiError>;

    async fn split_entry(&self, id: DbId, split_time: f64) -> Result<SplitResult, ApiError>;

    async fn merge_entry(&self, id: DbId) -> Result<SubtitleEntry, ApiError>;

    async fn list_styles(&self) -> Result<Vec<SubtitleStyle>, ApiError>;

    async fn list_exports(&self, project_id: Option<DbId>) -> Result<Vec<SubtitleExport>, ApiError>;

    async fn export_project(
        &self,
        project_id: DbId,
        request: &ExportRequest,
    ) -> Result<Artifact, ApiError>;

    async fn embed_subtitles(
        &self,
        project_id: DbId,
        options: &EmbedOptions,
    ) -> Result<EmbedResult, ApiError>;
}

#[async_trait]
impl SubtitleBackend for SubtitleApi {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        SubtitleApi::list_projects(self).await
    }

    async fn get_project(&self, id: DbId) -> Result<Project, ApiError> {
        SubtitleApi::get_project(self, id).await
    }

    async fn project_status(&self, id: DbId) -> Result<ProjectStatusReport, ApiError> {
        SubtitleApi::project_status(self, id).await
    }

    async fn upload_video(
        &self,
        form: UploadForm,
        on_progress: Option<ProgressFn>,
    ) -> Result<Project, ApiError> {
        SubtitleApi::upload_video(self, form, on_progress).await
    }

    async fn delete_project(&self, id: DbId) -> Result<(), ApiError> {
        SubtitleApi::delete_project(self, id).await
    }

    async fn project_subtitles(&self, project_id: DbId) -> Result<Vec<SubtitleEntry>, ApiError> {
        SubtitleApi::project_subtitles(self, project_id).await
    }

    async fn update_entry(
        &self,
        id: DbId,
        patch: &SubtitleEntryPatch,
    ) -> Result<SubtitleEntry, ApiError> {
        SubtitleApi::update_entry(self, id, patch).await
    }

    async fn delete_entry(&self, id: DbId) -> Result<(), ApiError> {
        SubtitleApi::delete_entry(self, id).await
    }

    async fn split_entry(&self, id: DbId, split_time: f64) -> Result<SplitResult, ApiError> {
        SubtitleApi::split_entry(self, id, split_time).await
    }

    async fn merge_entry(&self, id: DbId) -> Result<SubtitleEntry, ApiError> {
        SubtitleApi::merge_entry(self, id).await
    }

    async fn list_styles(&self) -> Result<Vec<SubtitleStyle>, ApiError> {
        SubtitleApi::list_styles(self).await
    }

    async fn list_exports(&self, project_id: Option<DbId>) -> Result<Vec<SubtitleExport>, ApiError> {
        SubtitleApi::list_exports(self, project_id).await
    }

    async fn export_project(
        &self,
        project_id: DbId,
        request: &ExportRequest,
    ) -> Result<Artifact, ApiError> {
        SubtitleApi::export_project(self, project_id, request).await
    }

    async fn embed_subtitles(
        &self,
        project_id: DbId,
        options: &EmbedOptions,
    ) -> Result<EmbedResult, ApiError> {
        SubtitleApi::embed_subtitles(self, project_id, options).await
    }
}
