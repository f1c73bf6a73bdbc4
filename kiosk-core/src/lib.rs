// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Kiosk Core Library
//!
//! Self-updating content delivery client: discovers the newest update
//! published by a remote origin, incrementally fetches and verifies the
//! files that compose it, persists them to a local content root, and
//! serves that root over loopback HTTP so a rendering surface can load
//! it as a normal web origin.

pub mod api;
pub mod content;
pub mod identity;
pub mod server;
pub mod sync;

pub use api::{
    CallbackHandler, EventDispatcher, EventHandler, Kiosk, KioskError, KioskResult, UpdaterEvent,
};
pub use content::{
    compute_digest, sanitize_relative_path, ContentStore, FetchError, FetchedFile, StoreError,
    TelemetryClient, UpdateClient, UpdateConfig, UpdateManifest, VersionIndex,
};
pub use identity::DeviceIdentity;
pub use server::{create_router, ContentServer, ServeState, ServerError};
pub use sync::{CycleOutcome, CyclePhase, CycleState, SyncError, SyncOrchestrator};
