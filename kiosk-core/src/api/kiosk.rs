// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Kiosk Orchestrator
//!
//! Main entry point for the Kiosk API. Owns the composition of the
//! update pipeline: identity, store, update client, telemetry, the
//! sync orchestrator, and the local content server. The platform shell
//! only ever talks to this type.
//!
//! Must be used from within a tokio runtime; cycles and the server
//! run as spawned tasks.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::info;

use crate::content::{ContentStore, TelemetryClient, UpdateClient, UpdateConfig};
use crate::identity::DeviceIdentity;
use crate::server::ContentServer;
use crate::sync::SyncOrchestrator;

use super::error::KioskResult;
use super::events::{EventDispatcher, EventHandler};

/// Main Kiosk orchestrator.
///
/// # Example
///
/// ```ignore
/// use kiosk_core::api::{Kiosk, CallbackHandler, UpdaterEvent};
/// use kiosk_core::content::UpdateConfig;
/// use std::sync::Arc;
///
/// let kiosk = Kiosk::new(UpdateConfig::default())?;
/// kiosk.add_event_handler(Arc::new(CallbackHandler::new(|event| {
///     println!("Event: {:?}", event);
/// })));
///
/// let addr = kiosk.start_server().await?;
/// kiosk.check_for_updates();
/// // ... later, on user pull-to-refresh:
/// kiosk.refresh();
/// ```
pub struct Kiosk {
    config: UpdateConfig,
    identity: DeviceIdentity,
    events: Arc<EventDispatcher>,
    orchestrator: Arc<SyncOrchestrator>,
    generation: AtomicU64,
    cycle: Mutex<Option<JoinHandle<()>>>,
    server: Mutex<Option<ContentServer>>,
}

impl Kiosk {
    /// Creates a new Kiosk instance.
    ///
    /// Loads (or creates) the device identity, opens the content root,
    /// and wires up the pipeline. Nothing is fetched or served yet.
    pub fn new(config: UpdateConfig) -> KioskResult<Self> {
        let identity = DeviceIdentity::load_or_create(&config.state_dir)?;
        let store = ContentStore::open(&config.content_root)?;
        let client = UpdateClient::new(&config)?;
        let telemetry = if config.telemetry_enabled {
            Some(TelemetryClient::new(&config, &identity)?)
        } else {
            None
        };

        let events = Arc::new(EventDispatcher::new());
        let orchestrator = Arc::new(SyncOrchestrator::new(
            client,
            store,
            telemetry,
            events.clone(),
        ));

        info!(target: "updater", device_id = %identity, "kiosk initialized");

        Ok(Self {
            config,
            identity,
            events,
            orchestrator,
            generation: AtomicU64::new(0),
            cycle: Mutex::new(None),
            server: Mutex::new(None),
        })
    }

    /// The stable device identity string.
    pub fn device_id(&self) -> &str {
        self.identity.id()
    }

    /// The active configuration.
    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// Adds an event handler.
    pub fn add_event_handler(&self, handler: Arc<dyn EventHandler>) {
        self.events.add_handler(handler);
    }

    /// Starts the local content server on the configured loopback
    /// port. Returns the bound address.
    pub async fn start_server(&self) -> KioskResult<SocketAddr> {
        let server =
            ContentServer::bind(self.config.content_root.clone(), self.config.serve_port).await?;
        let addr = server.local_addr();
        *self.server.lock().unwrap() = Some(server);
        Ok(addr)
    }

    /// Starts a sync cycle unless one is already running.
    ///
    /// Returns the generation of the running cycle.
    pub fn check_for_updates(&self) -> u64 {
        self.spawn_cycle(false)
    }

    /// User-triggered refresh: cancels the in-flight cycle (dropping
    /// all its pending fetches), resets per-cycle state, and starts a
    /// new cycle. Returns the new generation.
    pub fn refresh(&self) -> u64 {
        self.spawn_cycle(true)
    }

    fn spawn_cycle(&self, cancel_running: bool) -> u64 {
        let mut guard = self.cycle.lock().unwrap();

        if let Some(handle) = guard.take() {
            if !handle.is_finished() {
                if !cancel_running {
                    *guard = Some(handle);
                    return self.generation.load(Ordering::SeqCst);
                }
                info!(target: "updater", "cancelling in-flight sync cycle");
                handle.abort();
            }
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let orchestrator = self.orchestrator.clone();
        *guard = Some(tokio::spawn(async move {
            // Cycle errors surface through events and logs.
            let _ = orchestrator.run_cycle(generation).await;
        }));
        generation
    }

    /// Stops the content server and cancels any in-flight cycle.
    pub async fn shutdown(&self) {
        let cycle = self.cycle.lock().unwrap().take();
        if let Some(handle) = cycle {
            handle.abort();
        }

        let server = self.server.lock().unwrap().take();
        if let Some(server) = server {
            server.shutdown().await;
        }

        info!(target: "updater", "shutdown complete");
    }
}
