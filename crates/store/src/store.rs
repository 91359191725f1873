//! The subtitle editor's shared state holder.
//!
//! [`SubtitleStore`] is constructed once at application start and shared
//! via `Arc`. Every operation calls the [`SubtitleBackend`], then applies
//! the response to the local collections under a write lock and publishes
//! a [`StoreEvent`] per collection it touched.
//!
//! Failures are logged, written to the shared error slot as a fixed
//! message, and returned to the caller unchanged.
//!
//! Responses race each other: an operation takes a generation ticket for
//! the slot it writes before issuing its request, and its response is only
//! applied if no later operation took a ticket for the same slot.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use subtitler_client::{ApiError, Artifact, ProgressFn, UploadForm};
use subtitler_core::export::{EmbedOptions, EmbedResult, ExportFormat, ExportRequest, SubtitleExport};
use subtitler_core::project::{Project, ProjectStatusReport};
use subtitler_core::style::SubtitleStyle;
use subtitler_core::subtitle::{SplitResult, SubtitleEntry, SubtitleEntryPatch};
use subtitler_core::types::DbId;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

use crate::backend::SubtitleBackend;
use crate::collection::{dedup_by_id, insert_after, insert_front, remove_by_id, replace_in_place};
use crate::events::{StoreEvent, EVENT_CHANNEL_CAPACITY};
use crate::generation::{Generations, SyncSlot, Ticket};
use crate::operation::Operation;
use crate::options::{MergePolicy, RefetchPolicy, StoreOptions};
use crate::selectors;
use crate::state::StoreState;

// ---------------------------------------------------------------------------
// Sync results
// ---------------------------------------------------------------------------

/// What happened to local state after a remote call succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The response was applied to local state.
    Applied,
    /// The remote mutation succeeded but the target id is not held
    /// locally, so nothing changed. Callers should reload.
    NotFoundLocally,
    /// A later operation on the same slot was issued; this response was
    /// discarded.
    Superseded,
}

/// The remote result of an operation plus its effect on local state.
#[derive(Debug, Clone, PartialEq)]
pub struct Synced<T> {
    pub value: T,
    pub outcome: SyncOutcome,
}

impl<T> Synced<T> {
    fn new(value: T, outcome: SyncOutcome) -> Self {
        Self { value, outcome }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome == SyncOutcome::Applied
    }

    /// True when local state may have diverged from the service.
    pub fn needs_reload(&self) -> bool {
        self.outcome == SyncOutcome::NotFoundLocally
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

// ---------------------------------------------------------------------------
// SubtitleStore
// ---------------------------------------------------------------------------

struct Inner {
    state: StoreState,
    generations: Generations,
    /// Project requested by the latest `fetch_project`.
    current_target: Option<DbId>,
}

pub struct SubtitleStore {
    backend: Arc<dyn SubtitleBackend>,
    options: StoreOptions,
    inner: RwLock<Inner>,
    /// Loading operations currently running.
    in_flight: AtomicUsize,
    event_tx: broadcast::Sender<StoreEvent>,
    /// Master cancellation token -- cancelled by [`SubtitleStore::shutdown`].
    cancel: CancellationToken,
}

impl SubtitleStore {
    pub fn new(backend: Arc<dyn SubtitleBackend>, options: StoreOptions) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            options,
            inner: RwLock::new(Inner {
                state: StoreState::default(),
                generations: Generations::default(),
                current_target: None,
            }),
            in_flight: AtomicUsize::new(0),
            event_tx,
            cancel: CancellationToken::new(),
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    /// Abandon every in-flight operation. They fail with
    /// [`ApiError::Cancelled`] and leave local state untouched.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down subtitle store");
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    // ---- projects ----

    /// List all projects, replacing the Projects collection.
    pub async fn fetch_projects(&self) -> Result<Synced<Vec<Project>>, ApiError> {
        let op = Operation::FetchProjects;
        let _loading = self.begin(op).await;
        let ticket = self.issue(SyncSlot::Projects).await;

        let projects = self
            .remote(op, Some(ticket), self.backend.list_projects())
            .await?;
        let projects = unique("projects", projects);

        let listed = projects.clone();
        let outcome = self
            .commit(op, ticket, move |state, events| {
                state.projects = listed;
                events.push(StoreEvent::ProjectsChanged);
                true
            })
            .await;

        tracing::info!(count = projects.len(), outcome = ?outcome, "Projects fetched");
        Ok(Synced::new(projects, outcome))
    }

    /// Load one project and make it the current project. The Projects
    /// collection is not touched.
    pub async fn fetch_project(&self, id: DbId) -> Result<Synced<Project>, ApiError> {
        let op = Operation::FetchProject;
        let _loading = self.begin(op).await;
        let ticket = {
            let mut inner = self.inner.write().await;
            inner.current_target = Some(id);
            inner.generations.issue(SyncSlot::CurrentProject)
        };

        let project = self
            .remote(op, Some(ticket), self.backend.get_project(id))
            .await?;

        let current = project.clone();
        let outcome = self
            .commit(op, ticket, move |state, events| {
                state.current_project = Some(current);
                events.push(StoreEvent::CurrentProjectChanged);
                true
            })
            .await;

        Ok(Synced::new(project, outcome))
    }

    /// Upload a video as a new project and place it first in Projects.
    ///
    /// `on_progress` receives the sent fraction; the same fraction is also
    /// published as [`StoreEvent::UploadProgress`].
    pub async fn upload_video(
        &self,
        form: UploadForm,
        on_progress: Option<ProgressFn>,
    ) -> Result<Project, ApiError> {
        let op = Operation::UploadVideo;
        let _loading = self.begin(op).await;

        let event_tx = self.event_tx.clone();
        let progress: ProgressFn = Arc::new(move |fraction: f64| {
            if let Some(callback) = &on_progress {
                callback(fraction);
            }
            let _ = event_tx.send(StoreEvent::UploadProgress { fraction });
        });

        let project = self
            .remote(op, None, self.backend.upload_video(form, Some(progress)))
            .await?;

        {
            let mut inner = self.inner.write().await;
            // A listing issued before the upload may not contain the new project.
            inner.generations.invalidate(SyncSlot::Projects);
            insert_front(&mut inner.state.projects, project.clone());
        }
        self.publish(StoreEvent::ProjectsChanged);

        tracing::info!(project_id = project.id, name = %project.name, "Video uploaded");
        Ok(project)
    }

    /// Poll the processing status of one project and fold it into the
    /// matching entry of Projects and into the current project.
    ///
    /// Background polling: never touches the loading indicator or the
    /// error slot.
    pub async fn refresh_project_status(
        &self,
        id: DbId,
    ) -> Result<Synced<ProjectStatusReport>, ApiError> {
        let op = Operation::RefreshProjectStatus;
        let ticket = self.issue(SyncSlot::ProjectStatus(id)).await;

        let report = self
            .remote(op, Some(ticket), self.backend.project_status(id))
            .await?;

        let outcome = self
            .commit(op, ticket, |state, events| {
                let mut found = false;
                if let Some(project) = state.projects.iter_mut().find(|p| p.id == id) {
                    if project.apply_status(&report) {
                        tracing::info!(
                            project_id = id,
                            status = report.status.as_str(),
                            "Project status changed",
                        );
                    }
                    events.push(StoreEvent::ProjectsChanged);
                    found = true;
                }
                if let Some(current) = state.current_project.as_mut().filter(|p| p.id == id) {
                    current.apply_status(&report);
                    events.push(StoreEvent::CurrentProjectChanged);
                    found = true;
                }
                found
            })
            .await;

        Ok(Synced::new(report, outcome))
    }

    /// Delete a project remotely and drop it locally.
    ///
    /// If it was the current project, the current project is cleared. The
    /// loaded subtitle entries are left in place.
    pub async fn delete_project(&self, id: DbId) -> Result<Synced<()>, ApiError> {
        let op = Operation::DeleteProject;
        self.remote(op, None, self.backend.delete_project(id))
            .await?;

        let mut events = Vec::new();
        {
            let mut inner = self.inner.write().await;
            inner.generations.invalidate(SyncSlot::Projects);
            if remove_by_id(&mut inner.state.projects, id).is_some() {
                events.push(StoreEvent::ProjectsChanged);
            }
            if inner.current_target == Some(id) {
                // A fetch of the deleted project still in flight must not
                // make it current.
                inner.generations.invalidate(SyncSlot::CurrentProject);
            }
            if inner.state.current_project.as_ref().is_some_and(|p| p.id == id) {
                inner.generations.invalidate(SyncSlot::CurrentProject);
                inner.state.current_project = None;
                events.push(StoreEvent::CurrentProjectChanged);
            }
        }

        let outcome = if events.is_empty() {
            tracing::warn!(project_id = id, "Deleted project was not held locally");
            SyncOutcome::NotFoundLocally
        } else {
            SyncOutcome::Applied
        };
        for event in events {
            self.publish(event);
        }

        tracing::info!(project_id = id, "Project deleted");
        Ok(Synced::new((), outcome))
    }

    // ---- subtitle entries ----

    /// Load a project's entries into the Subtitles collection according to
    /// the configured [`RefetchPolicy`].
    pub async fn fetch_subtitles(
        &self,
        project_id: DbId,
    ) -> Result<Synced<Vec<SubtitleEntry>>, ApiError> {
        let op = Operation::FetchSubtitles;
        let ticket = self.issue(SyncSlot::Subtitles).await;

        let entries = self
            .remote(op, Some(ticket), self.backend.project_subtitles(project_id))
            .await?;
        let entries = unique("subtitles", entries);

        let policy = self.options.refetch_policy;
        let fetched = entries.clone();
        let outcome = self
            .commit(op, ticket, move |state, events| {
                state.subtitles = match policy {
                    RefetchPolicy::ReplaceAll => fetched,
                    RefetchPolicy::KeepNewerLocal => keep_newer_local(&state.subtitles, fetched),
                };
                events.push(StoreEvent::SubtitlesChanged);
                true
            })
            .await;

        tracing::debug!(project_id, count = entries.len(), "Subtitles fetched");
        Ok(Synced::new(entries, outcome))
    }

    /// Send a partial update and replace the entry at its current position.
    pub async fn update_subtitle(
        &self,
        id: DbId,
        patch: &SubtitleEntryPatch,
    ) -> Result<Synced<SubtitleEntry>, ApiError> {
        let op = Operation::UpdateSubtitle;
        let ticket = self.issue(SyncSlot::Entry(id)).await;

        let updated = self
            .remote(op, Some(ticket), self.backend.update_entry(id, patch))
            .await?;

        let entry = updated.clone();
        let outcome = self
            .commit(op, ticket, move |state, events| {
                if replace_in_place(&mut state.subtitles, id, entry).is_none() {
                    return false;
                }
                events.push(StoreEvent::SubtitlesChanged);
                true
            })
            .await;

        Ok(Synced::new(updated, outcome))
    }

    pub async fn delete_subtitle(&self, id: DbId) -> Result<Synced<()>, ApiError> {
        let op = Operation::DeleteSubtitle;
        let ticket = self.issue(SyncSlot::Entry(id)).await;

        self.remote(op, Some(ticket), self.backend.delete_entry(id))
            .await?;

        let outcome = self
            .commit(op, ticket, move |state, events| {
                if remove_by_id(&mut state.subtitles, id).is_none() {
                    return false;
                }
                events.push(StoreEvent::SubtitlesChanged);
                true
            })
            .await;

        Ok(Synced::new((), outcome))
    }

    /// Split an entry at `split_time` seconds. The shortened original stays
    /// in place and the new entry is inserted right after it.
    pub async fn split_subtitle(
        &self,
        id: DbId,
        split_time: f64,
    ) -> Result<Synced<SplitResult>, ApiError> {
        let op = Operation::SplitSubtitle;
        let ticket = self.issue(SyncSlot::Entry(id)).await;

        let result = self
            .remote(op, Some(ticket), self.backend.split_entry(id, split_time))
            .await?;

        let original = result.original_entry.clone();
        let new_entry = result.new_entry.clone();
        let outcome = self
            .commit(op, ticket, move |state, events| {
                let Some(index) = replace_in_place(&mut state.subtitles, id, original) else {
                    return false;
                };
                insert_after(&mut state.subtitles, index, new_entry);
                events.push(StoreEvent::SubtitlesChanged);
                true
            })
            .await;

        Ok(Synced::new(result, outcome))
    }

    /// Merge an entry with the neighbor the service picks and replace it in
    /// place. See [`MergePolicy`] for what happens to the absorbed neighbor.
    pub async fn merge_subtitle(&self, id: DbId) -> Result<Synced<SubtitleEntry>, ApiError> {
        let op = Operation::MergeSubtitle;
        let ticket = self.issue(SyncSlot::Entry(id)).await;

        let merged = self
            .remote(op, Some(ticket), self.backend.merge_entry(id))
            .await?;

        let entry = merged.clone();
        let outcome = self
            .commit(op, ticket, move |state, events| {
                if replace_in_place(&mut state.subtitles, id, entry).is_none() {
                    return false;
                }
                events.push(StoreEvent::SubtitlesChanged);
                true
            })
            .await;

        // Only reload entries that are still loaded; after the collection
        // was cleared the merge commits as NotFoundLocally.
        if self.options.merge_policy == MergePolicy::ReloadEntries
            && outcome == SyncOutcome::Applied
        {
            // The merge itself succeeded; a failed reload is reported
            // through the error slot only.
            if let Err(e) = self.fetch_subtitles(merged.project_id).await {
                tracing::warn!(entry_id = id, error = %e, "Reload after merge failed");
            }
        }

        Ok(Synced::new(merged, outcome))
    }

    // ---- styles and exports ----

    pub async fn fetch_styles(&self) -> Result<Synced<Vec<SubtitleStyle>>, ApiError> {
        let op = Operation::FetchStyles;
        let ticket = self.issue(SyncSlot::Styles).await;

        let styles = self
            .remote(op, Some(ticket), self.backend.list_styles())
            .await?;
        let styles = unique("styles", styles);

        let listed = styles.clone();
        let outcome = self
            .commit(op, ticket, move |state, events| {
                state.styles = listed;
                events.push(StoreEvent::StylesChanged);
                true
            })
            .await;

        Ok(Synced::new(styles, outcome))
    }

    /// List exports, optionally only those of one project.
    pub async fn fetch_exports(
        &self,
        project_id: Option<DbId>,
    ) -> Result<Synced<Vec<SubtitleExport>>, ApiError> {
        let op = Operation::FetchExports;
        let ticket = self.issue(SyncSlot::Exports).await;

        let exports = self
            .remote(op, Some(ticket), self.backend.list_exports(project_id))
            .await?;
        let exports = unique("exports", exports);

        let listed = exports.clone();
        let outcome = self
            .commit(op, ticket, move |state, events| {
                state.exports = listed;
                events.push(StoreEvent::ExportsChanged);
                true
            })
            .await;

        Ok(Synced::new(exports, outcome))
    }

    /// Render a project's subtitles in `format` and return the file.
    ///
    /// The Exports collection is not refreshed; call
    /// [`fetch_exports`](Self::fetch_exports) to list the new export.
    pub async fn export_subtitles(
        &self,
        project_id: DbId,
        format: ExportFormat,
        style_id: Option<DbId>,
    ) -> Result<Artifact, ApiError> {
        let op = Operation::ExportSubtitles;
        let request = ExportRequest { format, style_id };
        let artifact = self
            .remote(op, None, self.backend.export_project(project_id, &request))
            .await?;

        tracing::info!(
            project_id,
            format = format.as_str(),
            bytes = artifact.bytes.len(),
            "Subtitles exported",
        );
        Ok(artifact)
    }

    /// Burn a project's subtitles into its video. Like
    /// [`export_subtitles`](Self::export_subtitles), Exports is not touched.
    pub async fn embed_subtitles(
        &self,
        project_id: DbId,
        options: &EmbedOptions,
    ) -> Result<EmbedResult, ApiError> {
        let op = Operation::EmbedSubtitles;
        let result = self
            .remote(op, None, self.backend.embed_subtitles(project_id, options))
            .await?;

        tracing::info!(
            project_id,
            export_id = ?result.export_id,
            success = result.success,
            "Subtitles embedded",
        );
        Ok(result)
    }

    // ---- local resets ----

    pub async fn clear_error(&self) {
        let cleared = self.inner.write().await.state.error.take().is_some();
        if cleared {
            self.publish(StoreEvent::ErrorChanged(None));
        }
    }

    /// Forget the current project and its loaded entries. In-flight fetches
    /// of either are discarded when they complete.
    pub async fn clear_current_project(&self) {
        {
            let mut inner = self.inner.write().await;
            inner.generations.invalidate(SyncSlot::CurrentProject);
            inner.generations.invalidate(SyncSlot::Subtitles);
            inner.state.current_project = None;
            inner.state.subtitles.clear();
        }
        self.publish(StoreEvent::CurrentProjectChanged);
        self.publish(StoreEvent::SubtitlesChanged);
    }

    // ---- reads ----

    pub async fn snapshot(&self) -> StoreState {
        self.inner.read().await.state.clone()
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.inner.read().await.state.projects.clone()
    }

    pub async fn current_project(&self) -> Option<Project> {
        self.inner.read().await.state.current_project.clone()
    }

    pub async fn subtitles(&self) -> Vec<SubtitleEntry> {
        self.inner.read().await.state.subtitles.clone()
    }

    pub async fn styles(&self) -> Vec<SubtitleStyle> {
        self.inner.read().await.state.styles.clone()
    }

    pub async fn exports(&self) -> Vec<SubtitleExport> {
        self.inner.read().await.state.exports.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.state.error.clone()
    }

    /// True while any loading operation is running.
    pub fn loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn completed_projects(&self) -> Vec<Project> {
        let inner = self.inner.read().await;
        selectors::completed_projects(&inner.state.projects)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn processing_projects(&self) -> Vec<Project> {
        let inner = self.inner.read().await;
        selectors::processing_projects(&inner.state.projects)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn project_by_id(&self, id: DbId) -> Option<Project> {
        let inner = self.inner.read().await;
        selectors::project_by_id(&inner.state.projects, id).cloned()
    }

    pub async fn subtitles_by_project(&self, project_id: DbId) -> Vec<SubtitleEntry> {
        let inner = self.inner.read().await;
        selectors::subtitles_by_project(&inner.state.subtitles, project_id)
            .into_iter()
            .cloned()
            .collect()
    }

    // ---- private helpers ----

    fn publish(&self, event: StoreEvent) {
        // Only fails when nobody is subscribed.
        let _ = self.event_tx.send(event);
    }

    /// Start an operation. Loading operations raise the loading indicator
    /// until the returned guard drops and clear the error slot.
    async fn begin(&self, op: Operation) -> Option<LoadingGuard<'_>> {
        if !op.tracks_loading() {
            return None;
        }
        let guard = LoadingGuard::enter(self);
        self.clear_error().await;
        Some(guard)
    }

    async fn issue(&self, slot: SyncSlot) -> Ticket {
        self.inner.write().await.generations.issue(slot)
    }

    /// Run a backend call, racing the master cancellation token.
    async fn remote<T, F>(&self, op: Operation, ticket: Option<Ticket>, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ApiError::Cancelled),
            result = call => result,
        };
        match result {
            Ok(value) => Ok(value),
            Err(err) => Err(self.fail(op, ticket, err).await),
        }
    }

    async fn fail(&self, op: Operation, ticket: Option<Ticket>, err: ApiError) -> ApiError {
        let mut inner = self.inner.write().await;
        if let Some(ticket) = ticket {
            inner.generations.abandon(ticket);
        }

        if err.is_cancelled() {
            tracing::debug!(operation = op.as_str(), "Store operation cancelled");
            return err;
        }
        tracing::error!(operation = op.as_str(), error = %err, "Store operation failed");

        if let Some(message) = op.failure_message() {
            inner.state.error = Some(message.to_string());
            drop(inner);
            self.publish(StoreEvent::ErrorChanged(Some(message.to_string())));
        }
        err
    }

    /// Apply a response if `ticket` is still the latest for its slot.
    ///
    /// `apply` returns `false` when the target is not held locally; it must
    /// leave the state untouched in that case.
    async fn commit<F>(&self, op: Operation, ticket: Ticket, apply: F) -> SyncOutcome
    where
        F: FnOnce(&mut StoreState, &mut Vec<StoreEvent>) -> bool,
    {
        let mut events = Vec::new();
        {
            let mut inner = self.inner.write().await;
            if !inner.generations.redeem(ticket) {
                tracing::debug!(
                    operation = op.as_str(),
                    slot = ?ticket.slot(),
                    "Discarding superseded response",
                );
                return SyncOutcome::Superseded;
            }
            if !apply(&mut inner.state, &mut events) {
                tracing::warn!(
                    operation = op.as_str(),
                    slot = ?ticket.slot(),
                    "Target not held locally, local state unchanged",
                );
                return SyncOutcome::NotFoundLocally;
            }
        }
        for event in events {
            self.publish(event);
        }
        SyncOutcome::Applied
    }
}

/// Holds the loading indicator up for the lifetime of one operation.
struct LoadingGuard<'a> {
    store: &'a SubtitleStore,
}

impl<'a> LoadingGuard<'a> {
    fn enter(store: &'a SubtitleStore) -> Self {
        if store.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            store.publish(StoreEvent::LoadingChanged(true));
        }
        Self { store }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.store.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.store.publish(StoreEvent::LoadingChanged(false));
        }
    }
}

/// Drop repeated ids from a listing, keeping the first occurrence.
fn unique<T: crate::collection::Identified>(resource: &'static str, items: Vec<T>) -> Vec<T> {
    let (items, dropped) = dedup_by_id(items);
    if dropped > 0 {
        tracing::warn!(resource, dropped, "Listing contained duplicate ids, keeping first");
    }
    items
}

/// Fetched entries, except where the local copy is strictly newer.
fn keep_newer_local(local: &[SubtitleEntry], fetched: Vec<SubtitleEntry>) -> Vec<SubtitleEntry> {
    fetched
        .into_iter()
        .map(|entry| {
            let newer = local.iter().find(|l| {
                l.id == entry.id
                    && matches!((l.updated_at, entry.updated_at), (Some(mine), Some(theirs)) if mine > theirs)
            });
            match newer {
                Some(local_copy) => local_copy.clone(),
                None => entry,
            }
        })
        .collect()
}
