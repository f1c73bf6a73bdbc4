//! Telemetry side channel
//!
//! Fire-and-forget log shipment to the origin's `Telemetry.php`
//! endpoint. Never blocks the pipeline and never fails it: a failed
//! shipment produces one warning log and nothing else.

use base64::Engine;
use reqwest::Client;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use super::config::UpdateConfig;
use super::fetcher::FetchError;
use crate::identity::DeviceIdentity;

/// Wire payload, base64-encoded into the `data` query parameter.
#[derive(Serialize)]
struct TelemetryPayload<'a> {
    #[serde(rename = "deviceId")]
    device_id: &'a str,
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    timestamp: String,
}

/// Client for the telemetry side channel.
#[derive(Clone)]
pub struct TelemetryClient {
    client: Client,
    endpoint: String,
    device_id: String,
}

impl TelemetryClient {
    /// Create a telemetry client bound to one device identity.
    pub fn new(config: &UpdateConfig, identity: &DeviceIdentity) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint_url("Telemetry.php"),
            device_id: identity.id().to_string(),
        })
    }

    /// Ship one message. Spawns a task and returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn send(&self, message: &str, kind: &str) {
        let payload = TelemetryPayload {
            device_id: &self.device_id,
            message,
            kind,
            timestamp: unix_millis().to_string(),
        };

        let body = match serde_json::to_string(&payload) {
            Ok(b) => b,
            Err(e) => {
                warn!(target: "telemetry", error = %e, "failed to encode telemetry payload");
                return;
            }
        };
        let data = base64::engine::general_purpose::STANDARD.encode(body.as_bytes());
        let url = format!("{}?data={}", self.endpoint, data);
        let client = self.client.clone();

        tokio::spawn(async move {
            match client.get(&url).send().await {
                Ok(_) => debug!(target: "telemetry", "telemetry message sent"),
                Err(e) => {
                    warn!(target: "telemetry", error = %e, "failed to send telemetry message")
                }
            }
        });
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
