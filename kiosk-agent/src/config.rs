// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Agent configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use kiosk_core::UpdateConfig;

/// Environment-driven configuration for the agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Remote update origin.
    pub origin_url: String,
    /// API path prefix on the origin.
    pub api_path: String,
    /// Served content root.
    pub content_dir: PathBuf,
    /// State directory (device identity).
    pub state_dir: PathBuf,
    /// Loopback port for the content server.
    pub port: u16,
    /// Fetch timeout in seconds.
    pub timeout_secs: u64,
    /// Whether telemetry shipping is enabled.
    pub telemetry: bool,
}

impl AgentConfig {
    /// Load configuration from `KIOSK_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = UpdateConfig::default();
        Self {
            origin_url: env_or("KIOSK_ORIGIN", &defaults.origin_url),
            api_path: env_or("KIOSK_API_PATH", &defaults.api_path),
            content_dir: PathBuf::from(env_or("KIOSK_CONTENT_DIR", "content")),
            state_dir: PathBuf::from(env_or("KIOSK_STATE_DIR", ".")),
            port: env_parse("KIOSK_PORT", defaults.serve_port),
            timeout_secs: env_parse("KIOSK_TIMEOUT_SECS", defaults.timeout.as_secs()),
            telemetry: env_parse("KIOSK_TELEMETRY", true),
        }
    }

    /// Convert into the core pipeline configuration.
    pub fn to_update_config(&self) -> UpdateConfig {
        let mut config = UpdateConfig::default()
            .with_origin(self.origin_url.clone())
            .with_content_root(self.content_dir.clone())
            .with_state_dir(self.state_dir.clone())
            .with_serve_port(self.port);
        config.api_path = self.api_path.clone();
        config.timeout = Duration::from_secs(self.timeout_secs);
        if !self.telemetry {
            config = config.without_telemetry();
        }
        config
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
