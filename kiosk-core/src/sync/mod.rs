// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Update synchronization
//!
//! One sync cycle fans out from a single version index fetch to N
//! concurrent manifest fetches to M concurrent file fetches, with a
//! per-cycle dedup guard and a single readiness signal gated on the
//! newest update.

mod orchestrator;
mod state;

pub use orchestrator::{CycleOutcome, SyncError, SyncOrchestrator};
pub use state::{CyclePhase, CycleState};
