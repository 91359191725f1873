//! Background polling of projects that are still being transcribed.

use std::collections::HashSet;
use std::time::Duration;

use subtitler_core::project::ProjectStatus;
use subtitler_core::types::DbId;
use tokio_util::sync::CancellationToken;

use crate::store::SubtitleStore;

/// What a [`watch_processing`] run observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSummary {
    /// Polling rounds performed.
    pub rounds: u32,
    pub completed: Vec<DbId>,
    pub failed: Vec<DbId>,
    /// Projects the service no longer knows about.
    pub vanished: Vec<DbId>,
    pub cancelled: bool,
}

/// Poll the status of every processing project every `interval` until none
/// is processing any more or `cancel` fires.
///
/// Transient refresh failures are logged and retried on the next round.
pub async fn watch_processing(
    store: &SubtitleStore,
    interval: Duration,
    cancel: &CancellationToken,
) -> WatchSummary {
    let mut summary = WatchSummary::default();
    let mut vanished: HashSet<DbId> = HashSet::new();

    loop {
        let pending: Vec<DbId> = store
            .processing_projects()
            .await
            .into_iter()
            .map(|p| p.id)
            .filter(|id| !vanished.contains(id))
            .collect();
        if pending.is_empty() {
            tracing::info!(rounds = summary.rounds, "No projects left processing");
            return summary;
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Status watch cancelled");
                summary.cancelled = true;
                return summary;
            }
            _ = tokio::time::sleep(interval) => {}
        }
        summary.rounds += 1;
        tracing::debug!(round = summary.rounds, pending = pending.len(), "Polling project status");

        for id in pending {
            match store.refresh_project_status(id).await {
                Ok(synced) => match synced.value.status {
                    ProjectStatus::Completed => summary.completed.push(id),
                    ProjectStatus::Failed => summary.failed.push(id),
                    _ => {}
                },
                Err(e) if e.is_cancelled() => {
                    summary.cancelled = true;
                    return summary;
                }
                Err(e) if e.is_not_found() => {
                    tracing::warn!(project_id = id, "Project vanished while processing");
                    vanished.insert(id);
                    summary.vanished.push(id);
                }
                Err(e) => {
                    tracing::warn!(project_id = id, error = %e, "Status refresh failed, retrying next round");
                }
            }
        }
    }
}
