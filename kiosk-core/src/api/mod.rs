// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Kiosk API Layer
//!
//! High-level API for the self-updating content delivery client.
//!
//! # Overview
//!
//! The API layer provides the surface the platform shell talks to:
//! - [`Kiosk`] - the composition root and public operations
//!   (`check_for_updates`, `refresh`, `shutdown`)
//! - [`UpdaterEvent`] - status events the shell consumes
//! - [`KioskError`] - unified error type
//!
//! # Module Structure
//!
//! - [`error`] - Error types for the API layer
//! - [`events`] - Event system for callbacks
//! - [`kiosk`] - Main Kiosk orchestrator

mod error;
pub(crate) mod events;
mod kiosk;

pub use error::{KioskError, KioskResult};
pub use events::{CallbackHandler, EventDispatcher, EventHandler, UpdaterEvent};
pub use kiosk::Kiosk;
