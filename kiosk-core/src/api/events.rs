// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event System
//!
//! Status callbacks for the update pipeline. The shell (window,
//! splash screen, loading indicator) consumes these; the core never
//! depends on what the shell does with them.

use std::sync::{Arc, RwLock};

/// Events emitted by the update pipeline.
///
/// Every event carries the generation of the cycle that produced it so
/// observers can drop stale events after a refresh.
#[derive(Debug, Clone)]
pub enum UpdaterEvent {
    /// A sync cycle started.
    CycleStarted {
        /// Cycle generation counter.
        generation: u64,
    },

    /// A file was fetched, verified, and durably written.
    FileApplied {
        /// Cycle generation counter.
        generation: u64,
        /// Update the file belongs to.
        update_id: String,
        /// Path relative to the content root.
        path: String,
        /// Hex SHA-256 of the written bytes.
        digest: String,
    },

    /// The newest update is fully materialized; the content root is
    /// safe to serve. Emitted at most once per cycle.
    ContentReady {
        /// Cycle generation counter.
        generation: u64,
        /// The newest update identifier.
        update_id: String,
    },

    /// The version index fetch failed; the cycle stalled. A manual
    /// refresh is the only recovery.
    CycleFailed {
        /// Cycle generation counter.
        generation: u64,
        /// Error description.
        error: String,
    },
}

/// Event handler trait.
///
/// Implement this trait to receive updater events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: UpdaterEvent);
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(UpdaterEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(UpdaterEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(UpdaterEvent) + Send + Sync,
{
    fn on_event(&self, event: UpdaterEvent) {
        (self.callback)(event);
    }
}

/// Event dispatcher for managing multiple handlers.
///
/// Handlers may be registered after the pipeline holds its clone of
/// the dispatcher, so the list lives behind a lock.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an event handler.
    pub fn add_handler(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.write().unwrap().push(handler);
    }

    /// Removes all handlers.
    pub fn clear_handlers(&self) {
        self.handlers.write().unwrap().clear();
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.read().unwrap().len()
    }

    /// Dispatches an event to all handlers.
    pub fn dispatch(&self, event: UpdaterEvent) {
        for handler in self.handlers.read().unwrap().iter() {
            handler.on_event(event.clone());
        }
    }
}
