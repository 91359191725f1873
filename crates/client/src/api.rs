//! Typed wrappers over the subtitle service endpoints.
//!
//! List endpoints are normalized: a response that is not a JSON array is
//! treated as an empty list rather than an error.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use subtitler_core::export::{EmbedOptions, EmbedResult, ExportRequest, SubtitleExport};
use subtitler_core::project::{Project, ProjectStatusReport};
use subtitler_core::style::SubtitleStyle;
use subtitler_core::subtitle::{SplitRequest, SplitResult, SubtitleEntry, SubtitleEntryPatch};
use subtitler_core::types::DbId;

use crate::error::ApiError;
use crate::gateway::{ApiClient, Artifact};
use crate::paths;
use crate::upload::{ProgressFn, UploadForm};

/// Typed client for the `/api/subtitle/` endpoints.
#[derive(Clone)]
pub struct SubtitleApi {
    client: ApiClient,
}

impl SubtitleApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `GET /projects/`.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_list(paths::PROJECTS, "projects").await
    }

    /// `GET /projects/{id}/`.
    pub async fn get_project(&self, id: DbId) -> Result<Project, ApiError> {
        self.client.call(Method::GET, &paths::project(id), None).await
    }

    /// `GET /projects/{id}/status/`.
    pub async fn project_status(&self, id: DbId) -> Result<ProjectStatusReport, ApiError> {
        self.client
            .call(Method::GET, &paths::project_status(id), None)
            .await
    }

    /// `POST /projects/` as multipart; the service creates the project and
    /// starts transcription.
    pub async fn upload_video(
        &self,
        form: UploadForm,
        on_progress: Option<ProgressFn>,
    ) -> Result<Project, ApiError> {
        self.client
            .upload_with_progress(paths::PROJECTS, form, on_progress)
            .await
    }

    /// `DELETE /projects/{id}/`.
    pub async fn delete_project(&self, id: DbId) -> Result<(), ApiError> {
        self.client
            .call_empty(Method::DELETE, &paths::project(id), None)
            .await
    }

    /// `GET /projects/{id}/subtitles/`, in the service's order.
    pub async fn project_subtitles(&self, project_id: DbId) -> Result<Vec<SubtitleEntry>, ApiError> {
        self.get_list(&paths::project_subtitles(project_id), "subtitles")
            .await
    }

    /// `PATCH /entries/{id}/` with only the fields present in `patch`.
    pub async fn update_entry(
        &self,
        id: DbId,
        patch: &SubtitleEntryPatch,
    ) -> Result<SubtitleEntry, ApiError> {
        let body = encode(patch)?;
        self.client
            .call(Method::PATCH, &paths::entry(id), Some(&body))
            .await
    }

    /// `DELETE /entries/{id}/`.
    pub async fn delete_entry(&self, id: DbId) -> Result<(), ApiError> {
        self.client
            .call_empty(Method::DELETE, &paths::entry(id), None)
            .await
    }

    /// `POST /entries/{id}/split/` at `split_time` seconds.
    pub async fn split_entry(&self, id: DbId, split_time: f64) -> Result<SplitResult, ApiError> {
        let body = encode(&SplitRequest { split_time })?;
        self.client
            .call(Method::POST, &paths::entry_split(id), Some(&body))
            .await
    }

    /// `POST /entries/{id}/merge/`; the service picks the neighbor.
    pub async fn merge_entry(&self, id: DbId) -> Result<SubtitleEntry, ApiError> {
        self.client
            .call(Method::POST, &paths::entry_merge(id), None)
            .await
    }

    /// `GET /styles/`.
    pub async fn list_styles(&self) -> Result<Vec<SubtitleStyle>, ApiError> {
        self.get_list(paths::STYLES, "styles").await
    }

    /// `GET /exports/`, optionally filtered by project.
    pub async fn list_exports(&self, project_id: Option<DbId>) -> Result<Vec<SubtitleExport>, ApiError> {
        self.get_list(&paths::exports(project_id), "exports").await
    }

    /// `POST /projects/{id}/export/`; the body of the response is the
    /// artifact itself.
    pub async fn export_project(
        &self,
        project_id: DbId,
        request: &ExportRequest,
    ) -> Result<Artifact, ApiError> {
        let body = encode(request)?;
        self.client
            .call_bytes(Method::POST, &paths::project_export(project_id), Some(&body))
            .await
    }

    /// `POST /projects/{id}/embed_subtitles/`.
    pub async fn embed_subtitles(
        &self,
        project_id: DbId,
        options: &EmbedOptions,
    ) -> Result<EmbedResult, ApiError> {
        let body = encode(options)?;
        self.client
            .call(Method::POST, &paths::project_embed(project_id), Some(&body))
            .await
    }

    // ---- private helpers ----

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: &'static str,
    ) -> Result<Vec<T>, ApiError> {
        let value: serde_json::Value = self.client.call(Method::GET, path, None).await?;
        normalize_list(value, resource)
    }
}

fn encode<T: Serialize>(body: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(ApiError::Encode)
}

/// Decode a list response, mapping any non-array payload to an empty list.
///
/// Elements that do not decode as `T` are skipped with a warning; the rest
/// keep their order.
pub fn normalize_list<T: DeserializeOwned>(
    value: serde_json::Value,
    resource: &'static str,
) -> Result<Vec<T>, ApiError> {
    if let serde_json::Value::Array(items) = value {
        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value(item) {
                Ok(element) => decoded.push(element),
                Err(e) => tracing::warn!(
                    resource,
                    index,
                    error = %e,
                    "Skipping list element that failed to decode",
                ),
            }
        }
        return Ok(decoded);
    }
    tracing::warn!(
        resource,
        kind = json_kind(&value),
        "List endpoint returned a non-array payload, using an empty list",
    );
    Ok(Vec::new())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
