// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire types for the update protocol
//!
//! These types mirror the JSON bodies served by the update origin.
//! They are parsed once per fetch and never cached across sync cycles.

use serde::{Deserialize, Serialize};

/// Version index from the remote origin (`updates/versions.json`).
///
/// An ordered sequence of opaque update identifiers. The feed is not
/// guaranteed to arrive in any particular order; [`VersionIndex::newest`]
/// is the authoritative newest entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionIndex {
    /// Update identifiers as received from the origin.
    pub updates: Vec<String>,
}

impl VersionIndex {
    /// Authoritative newest update: the first element of the index
    /// sorted descending. The as-received order is *not* trusted here.
    pub fn newest(&self) -> Option<&str> {
        self.updates.iter().max().map(String::as_str)
    }

    /// True when the origin published no updates at all.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Manifest describing one update's contents
/// (`updates/{id}/manifest.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateManifest {
    /// The update this manifest belongs to.
    #[serde(rename = "updateId")]
    pub update_id: String,
    /// Relative paths of the files composing the update. Keys are
    /// unique within one manifest; overlap *across* manifests is
    /// handled by the orchestrator's dedup guard.
    #[serde(rename = "fileList")]
    pub file_list: Vec<String>,
}

/// A successfully fetched update file, alive only between network
/// completion and the store write.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    /// Update the file belongs to.
    pub update_id: String,
    /// Path relative to the content root.
    pub relative_path: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
    /// Lowercase hex SHA-256 of `content`.
    pub digest: String,
}
