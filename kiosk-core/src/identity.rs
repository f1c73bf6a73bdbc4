// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persisted device identity
//!
//! A stable opaque string created once (random UUID) and never mutated.
//! The pipeline only tags telemetry and logs with it; it never branches
//! on the value.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use uuid::Uuid;

const DEVICE_ID_FILE: &str = "device_id";

/// Stable device identity for telemetry and log tagging.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    id: String,
}

impl DeviceIdentity {
    /// Load the persisted identity from `state_dir`, generating and
    /// persisting a fresh UUIDv4 on first run.
    pub fn load_or_create(state_dir: &Path) -> Result<Self, io::Error> {
        let path = state_dir.join(DEVICE_ID_FILE);

        if let Ok(existing) = fs::read_to_string(&path) {
            let trimmed = existing.trim();
            if !trimmed.is_empty() {
                return Ok(Self {
                    id: trimmed.to_string(),
                });
            }
        }

        fs::create_dir_all(state_dir)?;
        let id = Uuid::new_v4().to_string();
        fs::write(&path, &id)?;
        Ok(Self { id })
    }

    /// Wrap an externally supplied identity string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The opaque identity string.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
