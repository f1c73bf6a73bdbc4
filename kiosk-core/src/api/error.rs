// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the Kiosk API layer.

use thiserror::Error;

use crate::content::{FetchError, StoreError};
use crate::server::ServerError;
use crate::sync::SyncError;

/// Unified error type for Kiosk operations.
#[derive(Error, Debug)]
pub enum KioskError {
    /// Fetching from the update origin failed.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Content store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Sync cycle failed.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Local content server failed.
    #[error("server error: {0}")]
    Server(#[from] ServerError),

    /// IO error outside the store (identity persistence, state dir).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Kiosk operations.
pub type KioskResult<T> = Result<T, KioskError>;
