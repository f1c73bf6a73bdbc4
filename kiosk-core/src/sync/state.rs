// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-cycle sync state
//!
//! One [`CycleState`] exists per sync cycle and is owned exclusively by
//! the cycle task; all mutation happens on that single task, which is
//! the serialization discipline for completions. A manual refresh
//! discards the whole state along with the cycle that owns it.

use std::collections::HashSet;

/// Phases of one sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// No cycle activity yet.
    Idle,
    /// Version index fetch issued.
    IndexRequested,
    /// Manifest fetches fanned out.
    ManifestsRequested,
    /// File fetches in flight.
    FilesPending,
    /// Newest update fully materialized; signaled once.
    Ready,
    /// Index fetch failed; cycle stalled until a manual refresh.
    Failed,
}

/// Mutable state of one sync cycle.
#[derive(Debug)]
pub struct CycleState {
    /// Generation counter tagging this cycle and its events.
    pub generation: u64,
    /// Current phase.
    pub phase: CyclePhase,
    /// Authoritative newest update identifier (sorted-descending head
    /// of the version index).
    pub newest_update: Option<String>,
    /// Dedup guard: paths claimed by a fetch this cycle. A path is
    /// inserted *before* its fetch completes so overlapping manifests
    /// never double-fetch.
    applied_files: HashSet<String>,
    /// File list of the newest update's manifest, once it arrives.
    pub newest_files: Option<Vec<String>>,
    /// Paths whose outcome is settled (written, or definitively
    /// skipped as missing/failed).
    settled_files: HashSet<String>,
    /// Readiness already signaled this cycle.
    pub ready_emitted: bool,
}

impl CycleState {
    /// Fresh state for a new cycle; the applied set starts empty.
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            phase: CyclePhase::Idle,
            newest_update: None,
            applied_files: HashSet::new(),
            newest_files: None,
            settled_files: HashSet::new(),
            ready_emitted: false,
        }
    }

    /// Claim a path for fetching (mark-before-complete).
    ///
    /// Returns false when the path was already claimed this cycle, in
    /// which case the caller must not fetch it again.
    pub fn claim(&mut self, path: &str) -> bool {
        self.applied_files.insert(path.to_string())
    }

    /// Record that a path's outcome is settled.
    pub fn settle(&mut self, path: &str) {
        self.settled_files.insert(path.to_string());
    }

    /// Number of paths claimed so far this cycle.
    pub fn claimed_count(&self) -> usize {
        self.applied_files.len()
    }

    /// True when the newest update's manifest has arrived and every
    /// path it lists has a settled outcome.
    pub fn newest_settled(&self) -> bool {
        match &self.newest_files {
            Some(files) => files.iter().all(|f| self.settled_files.contains(f)),
            None => false,
        }
    }
}
