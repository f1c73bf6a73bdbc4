// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Update client for the remote origin
//!
//! Fetches the version index, per-update manifests, and individual
//! update files. The client performs no retries and no deduplication;
//! both belong to the sync orchestrator. The origin's string sentinels
//! (`404_not_found`, empty body) are translated into typed errors here
//! and never leak past this layer.

use reqwest::Client;
use thiserror::Error;

use super::config::UpdateConfig;
use super::integrity::compute_digest;
use super::types::{FetchedFile, UpdateManifest, VersionIndex};

/// Literal body the origin returns for missing manifests and files.
const NOT_FOUND_SENTINEL: &[u8] = b"404_not_found";

/// HTTP client for the update origin.
#[derive(Clone)]
pub struct UpdateClient {
    client: Client,
    config: UpdateConfig,
}

impl UpdateClient {
    /// Create a new update client from config.
    pub fn new(config: &UpdateConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!(
                "Kiosk/{}",
                option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0")
            ))
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch the version index (`updates/versions.json`).
    pub async fn fetch_version_index(&self) -> Result<VersionIndex, FetchError> {
        let url = self.config.endpoint_url("updates/versions.json");
        let body = self.get_bytes(&url).await?;

        serde_json::from_slice(&body).map_err(|e| FetchError::MalformedResponse(e.to_string()))
    }

    /// Fetch one update's manifest (`updates/{id}/manifest.json`).
    ///
    /// The origin's `404_not_found` sentinel body becomes
    /// [`FetchError::ManifestMissing`], distinct from transport failure.
    pub async fn fetch_update_manifest(
        &self,
        update_id: &str,
    ) -> Result<UpdateManifest, FetchError> {
        let url = self
            .config
            .endpoint_url(&format!("updates/{update_id}/manifest.json"));
        let body = self.get_bytes(&url).await?;

        if body == NOT_FOUND_SENTINEL {
            return Err(FetchError::ManifestMissing(update_id.to_string()));
        }

        serde_json::from_slice(&body).map_err(|e| FetchError::MalformedResponse(e.to_string()))
    }

    /// Fetch one update file (`updates/GetLastFile.php?file={path}`).
    ///
    /// A sentinel or empty body is [`FetchError::FileMissing`]. The
    /// returned file carries its SHA-256 digest for logging and
    /// post-write verification.
    pub async fn fetch_file(
        &self,
        update_id: &str,
        relative_path: &str,
    ) -> Result<FetchedFile, FetchError> {
        let url = self.config.endpoint_url("updates/GetLastFile.php");
        let response = self
            .client
            .get(&url)
            .query(&[("file", relative_path)])
            .send()
            .await
            .map_err(transport_error)?;

        let body = self.read_body(response).await?;

        if body.is_empty() || body == NOT_FOUND_SENTINEL {
            return Err(FetchError::FileMissing {
                update_id: update_id.to_string(),
                path: relative_path.to_string(),
            });
        }

        let digest = compute_digest(&body);
        Ok(FetchedFile {
            update_id: update_id.to_string(),
            relative_path: relative_path.to_string(),
            content: body,
            digest,
        })
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        self.read_body(response).await
    }

    /// Read a response body, enforcing the size cap and status check.
    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        // Check content length before downloading
        if let Some(len) = response.content_length() {
            if len > self.config.max_file_size {
                return Err(FetchError::TooLarge {
                    size: len,
                    max: self.config.max_file_size,
                });
            }
        }

        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        // Verify size after download (in case content-length was missing)
        if body.len() as u64 > self.config.max_file_size {
            return Err(FetchError::TooLarge {
                size: body.len() as u64,
                max: self.config.max_file_size,
            });
        }

        Ok(body)
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(e.to_string())
    }
}

/// Errors that can occur while fetching from the origin.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Response body did not parse as the expected structure.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The origin reported the update's manifest as missing.
    #[error("manifest for update {0} is missing")]
    ManifestMissing(String),

    /// The origin reported the file as missing (sentinel or empty body).
    #[error("file {path} is missing in update {update_id}")]
    FileMissing {
        /// Update the file was listed in.
        update_id: String,
        /// Path relative to the content root.
        path: String,
    },

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Transport-level failure (DNS, connect, TLS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body exceeded the configured size cap.
    #[error("file too large: {size} bytes (max {max})")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        max: u64,
    },
}
