// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync orchestrator
//!
//! Owns the end-to-end update cycle: version index → manifests (all of
//! them, concurrently) → files (deduplicated via the cycle's applied
//! set) → readiness. Error policy:
//! - index fetch failure is cycle-fatal (no auto-retry),
//! - a missing or broken manifest skips that update only,
//! - a missing file or failed write skips that file only.
//!
//! Readiness gates on the *newest* update (sorted-descending head of
//! the index): once its manifest has arrived and every file it lists
//! has a settled outcome, `ContentReady` is emitted exactly once.
//!
//! All state mutation happens on the single task draining the join
//! sets, so completions are serialized without locks. Aborting the
//! cycle task drops the join sets, which cancels every in-flight fetch;
//! a refresh can therefore never bleed results into the next cycle.

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::api::events::{EventDispatcher, UpdaterEvent};
use crate::content::{
    ContentStore, FetchError, TelemetryClient, UpdateClient, UpdateManifest, VersionIndex,
};
use std::sync::Arc;

use super::state::{CyclePhase, CycleState};

/// How one sync cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The newest update was materialized and readiness was signaled.
    Ready {
        /// The newest update identifier.
        update_id: String,
    },
    /// All fetches drained but the newest update's manifest never
    /// arrived (missing, malformed, or empty index); no readiness.
    Drained,
}

/// Errors that abort a sync cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The version index fetch failed; the cycle stalls in `Failed`.
    #[error("version index fetch failed: {0}")]
    IndexFetch(#[source] FetchError),
}

/// Outcome of one file fetch/persist task.
struct FileOutcome {
    update_id: String,
    path: String,
    /// Digest of the written bytes; `None` when the file was skipped.
    digest: Option<String>,
}

/// Drives sync cycles against one origin and one content root.
pub struct SyncOrchestrator {
    client: UpdateClient,
    store: ContentStore,
    telemetry: Option<TelemetryClient>,
    events: Arc<EventDispatcher>,
}

impl SyncOrchestrator {
    /// Create an orchestrator over the given collaborators.
    pub fn new(
        client: UpdateClient,
        store: ContentStore,
        telemetry: Option<TelemetryClient>,
        events: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            client,
            store,
            telemetry,
            events,
        }
    }

    /// Run one complete sync cycle tagged with `generation`.
    ///
    /// Cancellation-safe: aborting the future cancels all in-flight
    /// manifest and file fetches.
    pub async fn run_cycle(&self, generation: u64) -> Result<CycleOutcome, SyncError> {
        let mut state = CycleState::new(generation);
        self.events.dispatch(UpdaterEvent::CycleStarted { generation });

        state.phase = CyclePhase::IndexRequested;
        info!(target: "updater", generation, "checking for updates");

        let index = match self.client.fetch_version_index().await {
            Ok(index) => index,
            Err(e) => {
                state.phase = CyclePhase::Failed;
                error!(target: "updater", generation, error = %e, "failed to check for updates");
                self.ship_telemetry(&format!("Failed to check for updates: {e}"), "error");
                self.events.dispatch(UpdaterEvent::CycleFailed {
                    generation,
                    error: e.to_string(),
                });
                return Err(SyncError::IndexFetch(e));
            }
        };

        state.newest_update = index.newest().map(str::to_string);
        state.phase = CyclePhase::ManifestsRequested;

        let mut manifests = self.spawn_manifest_fetches(&index);
        let mut files: JoinSet<FileOutcome> = JoinSet::new();

        while let Some(joined) = manifests.join_next().await {
            let (update_id, result) = match joined {
                Ok(v) => v,
                Err(e) => {
                    warn!(target: "updater", error = %e, "manifest task aborted");
                    continue;
                }
            };
            match result {
                Ok(manifest) => {
                    state.phase = CyclePhase::FilesPending;
                    self.apply_manifest(&manifest, &mut state, &mut files);
                    self.maybe_signal_ready(&mut state);
                }
                Err(FetchError::ManifestMissing(id)) => {
                    error!(target: "updater", update_id = %id, "update manifest is missing");
                    self.ship_telemetry(&format!("Update ID {id} manifest is missing"), "error");
                }
                Err(e) => {
                    error!(target: "updater", update_id = %update_id, error = %e, "failed to apply update");
                    self.ship_telemetry(&format!("Failed to apply update ID {update_id}: {e}"), "error");
                }
            }
        }

        while let Some(joined) = files.join_next().await {
            let outcome = match joined {
                Ok(v) => v,
                Err(e) => {
                    warn!(target: "updater", error = %e, "file task aborted");
                    continue;
                }
            };
            state.settle(&outcome.path);
            if let Some(digest) = outcome.digest {
                self.events.dispatch(UpdaterEvent::FileApplied {
                    generation,
                    update_id: outcome.update_id,
                    path: outcome.path,
                    digest,
                });
            }
            self.maybe_signal_ready(&mut state);
        }

        if state.ready_emitted {
            Ok(CycleOutcome::Ready {
                update_id: state.newest_update.unwrap_or_default(),
            })
        } else {
            warn!(
                target: "updater",
                generation,
                newest = state.newest_update.as_deref().unwrap_or("<none>"),
                "cycle drained without readiness"
            );
            Ok(CycleOutcome::Drained)
        }
    }

    /// Fan out a manifest fetch for every index entry, in received
    /// order. Every update in the index gets applied; the newest is
    /// only the completion signal.
    fn spawn_manifest_fetches(
        &self,
        index: &VersionIndex,
    ) -> JoinSet<(String, Result<UpdateManifest, FetchError>)> {
        let mut manifests = JoinSet::new();
        for update_id in index.updates.iter().cloned() {
            let client = self.client.clone();
            manifests.spawn(async move {
                let result = client.fetch_update_manifest(&update_id).await;
                (update_id, result)
            });
        }
        manifests
    }

    /// Fan out file fetches for one manifest, claiming each path in
    /// the dedup guard before the fetch starts.
    fn apply_manifest(
        &self,
        manifest: &UpdateManifest,
        state: &mut CycleState,
        files: &mut JoinSet<FileOutcome>,
    ) {
        info!(
            target: "updater",
            update_id = %manifest.update_id,
            files = manifest.file_list.len(),
            "applying update"
        );

        if state.newest_update.as_deref() == Some(manifest.update_id.as_str())
            && state.newest_files.is_none()
        {
            state.newest_files = Some(manifest.file_list.clone());
        }

        for path in &manifest.file_list {
            if !state.claim(path) {
                warn!(
                    target: "updater",
                    path = %path,
                    update_id = %manifest.update_id,
                    "file already applied in this cycle, skipping"
                );
                // Another manifest owns this path; its outcome settles it.
                continue;
            }

            let client = self.client.clone();
            let store = self.store.clone();
            let telemetry = self.telemetry.clone();
            let update_id = manifest.update_id.clone();
            let path = path.clone();
            files.spawn(async move {
                fetch_and_persist(client, store, telemetry, update_id, path).await
            });
        }
    }

    /// Emit `ContentReady` once per cycle, as soon as the newest
    /// update's manifest has arrived and all its files are settled.
    fn maybe_signal_ready(&self, state: &mut CycleState) {
        if state.ready_emitted || !state.newest_settled() {
            return;
        }
        state.ready_emitted = true;
        state.phase = CyclePhase::Ready;

        let update_id = state.newest_update.clone().unwrap_or_default();
        info!(target: "updater", update_id = %update_id, "content ready");
        self.events.dispatch(UpdaterEvent::ContentReady {
            generation: state.generation,
            update_id,
        });
    }

    fn ship_telemetry(&self, message: &str, kind: &str) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.send(message, kind);
        }
    }
}

/// Fetch one file and persist it. Failures are logged and reported as
/// a settled-but-unwritten outcome; they never abort the cycle.
async fn fetch_and_persist(
    client: UpdateClient,
    store: ContentStore,
    telemetry: Option<TelemetryClient>,
    update_id: String,
    path: String,
) -> FileOutcome {
    let skipped = |update_id: String, path: String| FileOutcome {
        update_id,
        path,
        digest: None,
    };

    match client.fetch_file(&update_id, &path).await {
        Ok(file) => {
            info!(
                target: "updater",
                path = %path,
                update_id = %update_id,
                digest = %file.digest,
                size = file.content.len(),
                "fetched file"
            );
            match store.write(&path, &file.content) {
                Ok(()) => FileOutcome {
                    update_id,
                    path,
                    digest: Some(file.digest),
                },
                Err(e) => {
                    error!(target: "updater", path = %path, error = %e, "failed to write file to disk");
                    if let Some(t) = &telemetry {
                        t.send(&format!("Failed to write {path} to disk: {e}"), "error");
                    }
                    skipped(update_id, path)
                }
            }
        }
        Err(FetchError::FileMissing { .. }) => {
            error!(
                target: "updater",
                path = %path,
                update_id = %update_id,
                "file is missing in update"
            );
            if let Some(t) = &telemetry {
                t.send(
                    &format!("File {path} is missing in update ID {update_id}"),
                    "error",
                );
            }
            skipped(update_id, path)
        }
        Err(e) => {
            error!(target: "updater", path = %path, update_id = %update_id, error = %e, "failed to download file");
            skipped(update_id, path)
        }
    }
}
