// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content delivery pipeline
//!
//! Everything between the remote origin and the local content root:
//! - Wire types for the version index and per-update manifests
//! - The update client fetching manifests and files
//! - The content store persisting files under the served root
//! - Digest computation for verification and logging
//! - The fire-and-forget telemetry side channel
//!
//! The content store is the sole writer of the content root; the local
//! server reads from it concurrently.

mod config;
mod fetcher;
mod integrity;
mod store;
mod telemetry;
mod types;

pub use config::UpdateConfig;
pub use fetcher::{FetchError, UpdateClient};
pub use integrity::compute_digest;
pub use store::{sanitize_relative_path, ContentStore, StoreError};
pub use telemetry::TelemetryClient;
pub use types::{FetchedFile, UpdateManifest, VersionIndex};
