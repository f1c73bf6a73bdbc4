//! End-to-end orchestrator tests against a fake origin.
//!
//! Covered behavior:
//! - per-cycle file dedup across overlapping manifests
//! - readiness gated on the sorted-descending newest update
//! - exactly one readiness signal per cycle
//! - missing manifests/files skip without stalling siblings
//! - index fetch failure fails the cycle
//! - a fresh cycle re-fetches paths applied in the previous one

use std::collections::HashMap;

use tempfile::TempDir;

use kiosk_core::{
    ContentStore, CycleOutcome, SyncError, SyncOrchestrator, UpdateClient, UpdateConfig,
};

use crate::fixture::{recording_dispatcher, Origin, SENTINEL};

fn test_config(base_url: &str, root: &std::path::Path) -> UpdateConfig {
    UpdateConfig::default()
        .with_origin(base_url)
        .with_content_root(root)
        .without_telemetry()
}

async fn orchestrator_for(
    origin: &Origin,
    root: &std::path::Path,
) -> (SyncOrchestrator, std::sync::Arc<crate::fixture::Recorder>) {
    let base_url = origin.serve().await;
    let config = test_config(&base_url, root);
    let client = UpdateClient::new(&config).unwrap();
    let store = ContentStore::open(&config.content_root).unwrap();
    let (events, recorder) = recording_dispatcher();
    (
        SyncOrchestrator::new(client, store, None, events),
        recorder,
    )
}

#[tokio::test]
async fn test_full_cycle_materializes_newest_update() {
    let temp = TempDir::new().unwrap();
    let mut origin = Origin::default();
    origin.updates = vec!["u1".into()];
    origin
        .manifests
        .insert("u1".into(), Origin::manifest_body("u1", &["index.html"]));
    origin
        .files
        .insert("index.html".into(), b"<html>hello</html>".to_vec());

    let (orchestrator, recorder) = orchestrator_for(&origin, temp.path()).await;
    let outcome = orchestrator.run_cycle(1).await.unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::Ready {
            update_id: "u1".into()
        }
    );
    assert_eq!(recorder.ready_events(), vec![(1, "u1".to_string())]);

    let store = ContentStore::open(temp.path()).unwrap();
    assert_eq!(store.read("index.html").unwrap(), b"<html>hello</html>");
}

#[tokio::test]
async fn test_shared_path_fetched_once_per_cycle() {
    let temp = TempDir::new().unwrap();
    let mut origin = Origin::default();
    origin.updates = vec!["u1".into(), "u2".into(), "u3".into()];
    // Three manifests all list shared.js; each has one unique file.
    for (id, unique) in [("u1", "a.txt"), ("u2", "b.txt"), ("u3", "c.txt")] {
        origin
            .manifests
            .insert(id.into(), Origin::manifest_body(id, &["shared.js", unique]));
    }
    for path in ["shared.js", "a.txt", "b.txt", "c.txt"] {
        origin.files.insert(path.into(), path.as_bytes().to_vec());
    }

    let (orchestrator, recorder) = orchestrator_for(&origin, temp.path()).await;
    let outcome = orchestrator.run_cycle(1).await.unwrap();

    assert!(matches!(outcome, CycleOutcome::Ready { .. }));
    assert_eq!(origin.fetch_count("shared.js"), 1);
    assert_eq!(origin.fetch_count("a.txt"), 1);
    assert_eq!(origin.fetch_count("c.txt"), 1);

    // The one fetch materialized the shared file.
    let applied = recorder.applied_paths();
    assert_eq!(applied.iter().filter(|p| *p == "shared.js").count(), 1);
}

#[tokio::test]
async fn test_readiness_gates_on_sorted_newest() {
    let temp = TempDir::new().unwrap();
    let mut origin = Origin::default();
    // Unsorted feed: the authoritative newest is u3, not u2.
    origin.updates = vec!["u2".into(), "u1".into(), "u3".into()];
    for id in ["u1", "u2", "u3"] {
        let file = format!("{id}.txt");
        origin
            .manifests
            .insert(id.into(), Origin::manifest_body(id, &[&file]));
        origin.files.insert(file.clone(), id.as_bytes().to_vec());
    }

    let (orchestrator, recorder) = orchestrator_for(&origin, temp.path()).await;
    let outcome = orchestrator.run_cycle(1).await.unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::Ready {
            update_id: "u3".into()
        }
    );
    assert_eq!(recorder.ready_events(), vec![(1, "u3".to_string())]);
}

#[tokio::test]
async fn test_ready_emitted_once_for_duplicate_newest() {
    let temp = TempDir::new().unwrap();
    let mut origin = Origin::default();
    // The same id listed twice: two manifest arrivals match the newest.
    origin.updates = vec!["u1".into(), "u1".into()];
    origin
        .manifests
        .insert("u1".into(), Origin::manifest_body("u1", &["index.html"]));
    origin.files.insert("index.html".into(), b"x".to_vec());

    let (orchestrator, recorder) = orchestrator_for(&origin, temp.path()).await;
    let outcome = orchestrator.run_cycle(1).await.unwrap();

    assert!(matches!(outcome, CycleOutcome::Ready { .. }));
    assert_eq!(recorder.ready_events().len(), 1);
    assert_eq!(origin.fetch_count("index.html"), 1);
}

#[tokio::test]
async fn test_missing_manifest_skips_update_without_stalling_siblings() {
    let temp = TempDir::new().unwrap();
    let mut origin = Origin::default();
    origin.updates = vec!["u1".into(), "u2".into()];
    // u1's manifest is the sentinel; u2 (the newest) is fine.
    origin.manifests.insert("u1".into(), SENTINEL.to_string());
    origin
        .manifests
        .insert("u2".into(), Origin::manifest_body("u2", &["app.js"]));
    origin.files.insert("app.js".into(), b"js".to_vec());

    let (orchestrator, recorder) = orchestrator_for(&origin, temp.path()).await;
    let outcome = orchestrator.run_cycle(1).await.unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::Ready {
            update_id: "u2".into()
        }
    );
    assert_eq!(recorder.ready_events().len(), 1);
    assert_eq!(recorder.failed_events().len(), 0);
}

#[tokio::test]
async fn test_missing_newest_manifest_drains_without_readiness() {
    let temp = TempDir::new().unwrap();
    let mut origin = Origin::default();
    origin.updates = vec!["u1".into(), "u2".into()];
    // The newest (u2) has no manifest; u1 still applies.
    origin
        .manifests
        .insert("u1".into(), Origin::manifest_body("u1", &["old.txt"]));
    origin.files.insert("old.txt".into(), b"old".to_vec());

    let (orchestrator, recorder) = orchestrator_for(&origin, temp.path()).await;
    let outcome = orchestrator.run_cycle(1).await.unwrap();

    assert_eq!(outcome, CycleOutcome::Drained);
    assert!(recorder.ready_events().is_empty());

    // Sibling update was still applied.
    let store = ContentStore::open(temp.path()).unwrap();
    assert_eq!(store.read("old.txt").unwrap(), b"old");
}

#[tokio::test]
async fn test_missing_file_is_skipped_not_fatal() {
    let temp = TempDir::new().unwrap();
    let mut origin = Origin::default();
    origin.updates = vec!["u1".into()];
    origin.manifests.insert(
        "u1".into(),
        Origin::manifest_body("u1", &["present.txt", "absent.txt", "empty.txt"]),
    );
    origin.files.insert("present.txt".into(), b"here".to_vec());
    // absent.txt not registered -> sentinel; empty.txt -> empty body.
    origin.files.insert("empty.txt".into(), Vec::new());

    let (orchestrator, recorder) = orchestrator_for(&origin, temp.path()).await;
    let outcome = orchestrator.run_cycle(1).await.unwrap();

    // Missing files settle; readiness still fires.
    assert!(matches!(outcome, CycleOutcome::Ready { .. }));
    assert_eq!(recorder.applied_paths(), vec!["present.txt".to_string()]);

    let store = ContentStore::open(temp.path()).unwrap();
    assert_eq!(store.read("present.txt").unwrap(), b"here");
    assert!(store.read("absent.txt").is_err());
    assert!(store.read("empty.txt").is_err());
}

#[tokio::test]
async fn test_traversal_path_in_manifest_never_escapes_root() {
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("root");

    let mut origin = Origin::default();
    origin.updates = vec!["u1".into()];
    origin.manifests.insert(
        "u1".into(),
        Origin::manifest_body("u1", &["../secret", "ok.txt"]),
    );
    origin.files.insert("../secret".into(), b"evil".to_vec());
    origin.files.insert("ok.txt".into(), b"fine".to_vec());

    let (orchestrator, _recorder) = orchestrator_for(&origin, &root).await;
    let outcome = orchestrator.run_cycle(1).await.unwrap();

    // The write is rejected; nothing lands outside the root.
    assert!(matches!(outcome, CycleOutcome::Ready { .. }));
    assert!(!parent.path().join("secret").exists());
    let store = ContentStore::open(&root).unwrap();
    assert_eq!(store.read("ok.txt").unwrap(), b"fine");
}

#[tokio::test]
async fn test_index_fetch_failure_fails_cycle() {
    let temp = TempDir::new().unwrap();
    // No routes registered at all: versions.json is a plain 404.
    let origin = Origin::default();
    let base_url = origin.serve().await;
    // Point at a path where nothing is mounted.
    let config = test_config(&base_url, temp.path());
    let client = UpdateClient::new(&config).unwrap();
    let store = ContentStore::open(&config.content_root).unwrap();
    let (events, recorder) = recording_dispatcher();
    let orchestrator = SyncOrchestrator::new(client, store, None, events);

    // Empty updates list is still a valid index; force a hard failure
    // by tearing the URL instead.
    let broken_config = test_config("http://127.0.0.1:1", temp.path());
    let broken_client = UpdateClient::new(&broken_config).unwrap();
    let broken_store = ContentStore::open(&broken_config.content_root).unwrap();
    let (broken_events, broken_recorder) = recording_dispatcher();
    let broken = SyncOrchestrator::new(broken_client, broken_store, None, broken_events);

    let result = broken.run_cycle(1).await;
    assert!(matches!(result, Err(SyncError::IndexFetch(_))));
    assert_eq!(broken_recorder.failed_events().len(), 1);
    assert!(broken_recorder.ready_events().is_empty());

    // Sanity: the healthy orchestrator with an empty index drains.
    let outcome = orchestrator.run_cycle(1).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Drained);
    assert!(recorder.failed_events().is_empty());
}

#[tokio::test]
async fn test_new_cycle_refetches_previously_applied_paths() {
    let temp = TempDir::new().unwrap();
    let mut origin = Origin::default();
    origin.updates = vec!["u1".into()];
    origin
        .manifests
        .insert("u1".into(), Origin::manifest_body("u1", &["index.html"]));
    origin.files.insert("index.html".into(), b"v1".to_vec());

    let (orchestrator, recorder) = orchestrator_for(&origin, temp.path()).await;

    orchestrator.run_cycle(1).await.unwrap();
    assert_eq!(origin.fetch_count("index.html"), 1);

    // Manual refresh: the applied set is per-cycle, so the path is
    // fetched again.
    orchestrator.run_cycle(2).await.unwrap();
    assert_eq!(origin.fetch_count("index.html"), 2);

    let generations: HashMap<u64, usize> =
        recorder
            .ready_events()
            .into_iter()
            .fold(HashMap::new(), |mut acc, (generation, _)| {
                *acc.entry(generation).or_insert(0) += 1;
                acc
            });
    assert_eq!(generations.get(&1), Some(&1));
    assert_eq!(generations.get(&2), Some(&1));
}
