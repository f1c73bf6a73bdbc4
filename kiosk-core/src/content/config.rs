//! Configuration for the update pipeline

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the update client, content store, and local server.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Remote origin, e.g. "https://updates.example.org".
    pub origin_url: String,

    /// API path prefix on the origin, e.g. "/api/v1/".
    pub api_path: String,

    /// On-disk directory acting as the served document root.
    pub content_root: PathBuf,

    /// Directory holding the persisted device identity.
    pub state_dir: PathBuf,

    /// Loopback port for the local content server.
    pub serve_port: u16,

    /// HTTP timeout for fetches.
    pub timeout: Duration,

    /// Maximum size of a single update file (bytes).
    pub max_file_size: u64,

    /// Enable/disable the telemetry side channel.
    pub telemetry_enabled: bool,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            origin_url: "https://updates.example.org".to_string(),
            api_path: "/api/v1/".to_string(),
            content_root: PathBuf::from("content"),
            state_dir: PathBuf::from("."),
            serve_port: 36906,
            timeout: Duration::from_secs(30),
            max_file_size: 32 * 1024 * 1024, // 32 MB
            telemetry_enabled: true,
        }
    }
}

impl UpdateConfig {
    /// Configure the remote origin.
    pub fn with_origin(mut self, origin_url: impl Into<String>) -> Self {
        self.origin_url = origin_url.into();
        self
    }

    /// Configure the content root directory.
    pub fn with_content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.content_root = root.into();
        self
    }

    /// Configure the state directory.
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    /// Configure the local server port (0 picks an ephemeral port).
    pub fn with_serve_port(mut self, port: u16) -> Self {
        self.serve_port = port;
        self
    }

    /// Disable the telemetry side channel.
    pub fn without_telemetry(mut self) -> Self {
        self.telemetry_enabled = false;
        self
    }

    /// Full URL for an endpoint relative to the API path.
    ///
    /// Normalizes slashes so that "https://o", "/api/" and
    /// "updates/versions.json" join cleanly.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let origin = self.origin_url.trim_end_matches('/');
        let api = self.api_path.trim_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        if api.is_empty() {
            format!("{origin}/{endpoint}")
        } else {
            format!("{origin}/{api}/{endpoint}")
        }
    }
}
