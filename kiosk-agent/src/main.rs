// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Kiosk Agent
//!
//! Headless shell around the kiosk-core pipeline: builds the
//! composition root from environment config, starts the local content
//! server, runs a sync cycle, and keeps serving until Ctrl-C.

mod config;

use std::sync::Arc;

use tracing::{error, info};

use kiosk_core::{CallbackHandler, Kiosk, UpdaterEvent};

use config::AgentConfig;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("updater=info".parse().unwrap())
                .add_directive("server=info".parse().unwrap()),
        )
        .init();

    let agent_config = AgentConfig::from_env();
    info!(
        "Starting Kiosk Agent v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Origin: {}", agent_config.origin_url);
    info!("Content root: {}", agent_config.content_dir.display());

    let kiosk = match Kiosk::new(agent_config.to_update_config()) {
        Ok(k) => k,
        Err(e) => {
            error!("failed to initialize kiosk: {e}");
            std::process::exit(1);
        }
    };
    info!("Device ID: {}", kiosk.device_id());

    kiosk.add_event_handler(Arc::new(CallbackHandler::new(|event| match event {
        UpdaterEvent::ContentReady {
            generation,
            update_id,
        } => {
            info!(generation, update_id = %update_id, "content available");
        }
        UpdaterEvent::CycleFailed { generation, error } => {
            error!(generation, error = %error, "sync cycle failed");
        }
        _ => {}
    })));

    let addr = match kiosk.start_server().await {
        Ok(addr) => addr,
        Err(e) => {
            error!("failed to start content server: {e}");
            std::process::exit(1);
        }
    };
    info!("Serving content on http://{addr}");

    kiosk.check_for_updates();

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(e) => error!("failed to listen for shutdown signal: {e}"),
    }

    kiosk.shutdown().await;
}
