//! Shared fixtures for store integration tests.
//!
//! [`FakeBackend`] is a small in-memory subtitle service: it keeps its own
//! projects and entries, applies mutations the way the real service does,
//! and lets a test inject HTTP failures or hold a response until released.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use subtitler_client::{ApiError, Artifact, ProgressFn, UploadForm};
use subtitler_core::export::{EmbedOptions, EmbedResult, ExportRequest, SubtitleExport};
use subtitler_core::project::{Project, ProjectStatus, ProjectStatusReport};
use subtitler_core::style::SubtitleStyle;
use subtitler_core::subtitle::{SplitResult, SubtitleEntry, SubtitleEntryPatch};
use subtitler_core::types::DbId;
use subtitler_store::{StoreOptions, SubtitleBackend, SubtitleStore};
use tokio::sync::oneshot;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn project(id: DbId, status: &str) -> Project {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("Project {id}"),
        "status": status,
        "language": "en",
        "created_at": "2024-03-01T10:00:00Z"
    }))
    .unwrap()
}

pub fn entry(id: DbId, project: DbId, start: f64, end: f64, text: &str) -> SubtitleEntry {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "project": project,
        "start_time": start,
        "end_time": end,
        "text": text
    }))
    .unwrap()
}

pub fn style(id: DbId, name: &str) -> SubtitleStyle {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "css_class": name.to_lowercase()
    }))
    .unwrap()
}

pub fn export(id: DbId, project: DbId, format: &str) -> SubtitleExport {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "project": project,
        "format": format
    }))
    .unwrap()
}

pub fn ids<T: HasId>(items: &[T]) -> Vec<DbId> {
    items.iter().map(HasId::id).collect()
}

pub trait HasId {
    fn id(&self) -> DbId;
}

impl HasId for Project {
    fn id(&self) -> DbId {
        self.id
    }
}

impl HasId for SubtitleEntry {
    fn id(&self) -> DbId {
        self.id
    }
}

pub fn store_for(backend: &Arc<FakeBackend>, options: StoreOptions) -> Arc<SubtitleStore> {
    let backend: Arc<dyn SubtitleBackend> = backend.clone();
    Arc::new(SubtitleStore::new(backend, options))
}

pub fn http_error(status: u16) -> ApiError {
    let status_text = match status {
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        _ => "Internal Server Error",
    };
    ApiError::Http {
        status,
        status_text: status_text.to_string(),
        body: String::new(),
    }
}

// ---------------------------------------------------------------------------
// Held responses
// ---------------------------------------------------------------------------

struct Hold {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

/// A response the fake has computed but not yet returned.
pub struct Held {
    entered: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl Held {
    /// Wait until the held call has reached the fake.
    pub async fn wait_entered(&mut self) {
        let _ = (&mut self.entered).await;
    }

    pub fn release(self) {
        let _ = self.release.send(());
    }
}

// ---------------------------------------------------------------------------
// FakeBackend
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeState {
    projects: Vec<Project>,
    entries: Vec<SubtitleEntry>,
    styles: Vec<SubtitleStyle>,
    exports: Vec<SubtitleExport>,
    status_script: HashMap<DbId, VecDeque<ProjectStatus>>,
    failures: HashMap<&'static str, VecDeque<u16>>,
    holds: HashMap<&'static str, VecDeque<Hold>>,
    calls: Vec<&'static str>,
    next_id: DbId,
    clock: i64,
}

impl FakeState {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn entry_index(&self, id: DbId) -> Result<usize, ApiError> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| http_error(404))
    }

    fn tick(&mut self) -> chrono::DateTime<Utc> {
        self.clock += 1;
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + ChronoDuration::seconds(self.clock)
    }
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        backend.state().next_id = 1000;
        Arc::new(backend)
    }

    pub fn with_projects(self: Arc<Self>, projects: Vec<Project>) -> Arc<Self> {
        self.state().projects = projects;
        self
    }

    pub fn with_entries(self: Arc<Self>, entries: Vec<SubtitleEntry>) -> Arc<Self> {
        self.state().entries = entries;
        self
    }

    pub fn with_styles(self: Arc<Self>, styles: Vec<SubtitleStyle>) -> Arc<Self> {
        self.state().styles = styles;
        self
    }

    pub fn with_exports(self: Arc<Self>, exports: Vec<SubtitleExport>) -> Arc<Self> {
        self.state().exports = exports;
        self
    }

    /// Statuses reported by successive status polls of project `id`. The
    /// last one repeats once the script runs out.
    pub fn script_status(&self, id: DbId, statuses: &[ProjectStatus]) {
        self.state()
            .status_script
            .insert(id, statuses.iter().copied().collect());
    }

    /// Change a project's status on the service side without a poll.
    pub fn set_status(&self, id: DbId, status: ProjectStatus) {
        if let Some(project) = self.state().projects.iter_mut().find(|p| p.id == id) {
            project.status = status;
        }
    }

    /// Drop a project on the service side.
    pub fn remove_project(&self, id: DbId) {
        self.state().projects.retain(|p| p.id != id);
    }

    /// Make the next `call` fail with HTTP `status`.
    pub fn fail_next(&self, call: &'static str, status: u16) {
        self.state()
            .failures
            .entry(call)
            .or_default()
            .push_back(status);
    }

    /// Hold the response of the next `call` until [`Held::release`].
    pub fn hold(&self, call: &'static str) -> Held {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.state().holds.entry(call).or_default().push_back(Hold {
            entered: entered_tx,
            release: release_rx,
        });
        Held {
            entered: entered_rx,
            release: release_tx,
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn server_entries(&self) -> Vec<SubtitleEntry> {
        self.state().entries.clone()
    }

    pub fn server_projects(&self) -> Vec<Project> {
        self.state().projects.clone()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Record the call, compute its result against the fake's state, then
    /// wait for a hold on the call if one is registered.
    async fn respond<T>(
        &self,
        call: &'static str,
        compute: impl FnOnce(&mut FakeState) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let (result, hold) = {
            let mut state = self.state();
            state.calls.push(call);
            let hold = state.holds.get_mut(call).and_then(VecDeque::pop_front);
            let failure = state.failures.get_mut(call).and_then(VecDeque::pop_front);
            let result = match failure {
                Some(status) => Err(http_error(status)),
                None => compute(&mut state),
            };
            (result, hold)
        };
        if let Some(hold) = hold {
            let _ = hold.entered.send(());
            let _ = hold.release.await;
        }
        result
    }
}

#[async_trait]
impl SubtitleBackend for FakeBackend {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.respond("list_projects", |s| Ok(s.projects.clone()))
            .await
    }

    async fn get_project(&self, id: DbId) -> Result<Project, ApiError> {
        self.respond("get_project", |s| {
            s.projects
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| http_error(404))
        })
        .await
    }

    async fn project_status(&self, id: DbId) -> Result<ProjectStatusReport, ApiError> {
        self.respond("project_status", |s| {
            let next = s.status_script.get_mut(&id).and_then(|script| {
                if script.len() > 1 {
                    script.pop_front()
                } else {
                    script.front().copied()
                }
            });
            let project = s
                .projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| http_error(404))?;
            if let Some(status) = next {
                project.status = status;
            }
            Ok(ProjectStatusReport {
                id,
                status: project.status,
                subtitle_count: project.subtitle_count,
            })
        })
        .await
    }

    async fn upload_video(
        &self,
        form: UploadForm,
        on_progress: Option<ProgressFn>,
    ) -> Result<Project, ApiError> {
        let name = form
            .fields()
            .iter()
            .find(|(key, _)| key == "name")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        let created = self
            .respond("upload_video", |s| {
                let mut created = project(s.allocate_id(), "uploading");
                created.name = name;
                s.projects.insert(0, created.clone());
                Ok(created)
            })
            .await?;
        if let Some(progress) = on_progress {
            progress(0.5);
            progress(1.0);
        }
        Ok(created)
    }

    async fn delete_project(&self, id: DbId) -> Result<(), ApiError> {
        self.respond("delete_project", |s| {
            let index = s
                .projects
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| http_error(404))?;
            s.projects.remove(index);
            s.entries.retain(|e| e.project_id != id);
            Ok(())
        })
        .await
    }

    async fn project_subtitles(&self, project_id: DbId) -> Result<Vec<SubtitleEntry>, ApiError> {
        self.respond("project_subtitles", |s| {
            Ok(s.entries
                .iter()
                .filter(|e| e.project_id == project_id)
                .cloned()
                .collect())
        })
        .await
    }

    async fn update_entry(
        &self,
        id: DbId,
        patch: &SubtitleEntryPatch,
    ) -> Result<SubtitleEntry, ApiError> {
        let patch = patch.clone();
        self.respond("update_entry", move |s| {
            let index = s.entry_index(id)?;
            let now = s.tick();
            let entry = &mut s.entries[index];
            if let Some(text) = patch.text {
                entry.text = text;
            }
            if let Some(start) = patch.start_time {
                entry.start_time = start;
            }
            if let Some(end) = patch.end_time {
                entry.end_time = end;
            }
            if let Some(language) = patch.language {
                entry.language = language;
            }
            entry.is_edited = true;
            entry.updated_at = Some(now);
            Ok(entry.clone())
        })
        .await
    }

    async fn delete_entry(&self, id: DbId) -> Result<(), ApiError> {
        self.respond("delete_entry", |s| {
            let index = s.entry_index(id)?;
            s.entries.remove(index);
            Ok(())
        })
        .await
    }

    async fn split_entry(&self, id: DbId, split_time: f64) -> Result<SplitResult, ApiError> {
        self.respond("split_entry", |s| {
            let index = s.entry_index(id)?;
            let original = &s.entries[index];
            if split_time <= original.start_time || split_time >= original.end_time {
                return Err(http_error(400));
            }
            let mut new_entry = original.clone();
            new_entry.id = s.allocate_id();
            new_entry.start_time = split_time;

            let original = &mut s.entries[index];
            original.end_time = split_time;
            let original_entry = original.clone();

            s.entries.insert(index + 1, new_entry.clone());
            Ok(SplitResult {
                original_entry,
                new_entry,
            })
        })
        .await
    }

    async fn merge_entry(&self, id: DbId) -> Result<SubtitleEntry, ApiError> {
        self.respond("merge_entry", |s| {
            let index = s.entry_index(id)?;
            let project_id = s.entries[index].project_id;
            let neighbor = s
                .entries
                .get(index + 1)
                .filter(|n| n.project_id == project_id)
                .cloned()
                .ok_or_else(|| http_error(400))?;

            let merged = &mut s.entries[index];
            merged.end_time = neighbor.end_time;
            merged.text = format!("{} {}", merged.text, neighbor.text);
            let merged = merged.clone();
            s.entries.remove(index + 1);
            Ok(merged)
        })
        .await
    }

    async fn list_styles(&self) -> Result<Vec<SubtitleStyle>, ApiError> {
        self.respond("list_styles", |s| Ok(s.styles.clone())).await
    }

    async fn list_exports(&self, project_id: Option<DbId>) -> Result<Vec<SubtitleExport>, ApiError> {
        self.respond("list_exports", |s| {
            Ok(s.exports
                .iter()
                .filter(|e| project_id.map_or(true, |id| e.project_id == id))
                .cloned()
                .collect())
        })
        .await
    }

    async fn export_project(
        &self,
        project_id: DbId,
        request: &ExportRequest,
    ) -> Result<Artifact, ApiError> {
        let format = request.format;
        self.respond("export_project", move |s| {
            if !s.projects.iter().any(|p| p.id == project_id) {
                return Err(http_error(404));
            }
            let id = s.allocate_id();
            let mut record = export(id, project_id, format.as_str());
            record.file = Some(format!("exports/{project_id}_{}", format.as_str()));
            s.exports.push(record);
            Ok(Artifact {
                bytes: Bytes::from(format!("{} export of {project_id}", format.as_str())),
                content_type: Some("text/plain".to_string()),
                file_name: Some(format!("{project_id}.{}", format.as_str())),
            })
        })
        .await
    }

    async fn embed_subtitles(
        &self,
        project_id: DbId,
        options: &EmbedOptions,
    ) -> Result<EmbedResult, ApiError> {
        let style = options.style.clone();
        self.respond("embed_subtitles", move |s| {
            if !s.projects.iter().any(|p| p.id == project_id) {
                return Err(http_error(404));
            }
            let id = s.allocate_id();
            s.exports.push(export(id, project_id, "embedded_video"));
            Ok(EmbedResult {
                success: true,
                export_id: Some(id),
                download_url: Some(format!("/media/exports/{project_id}_embedded.mp4")),
                message: format!("Subtitles embedded with style {style}"),
            })
        })
        .await
    }
}
