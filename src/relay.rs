//! Transport relay: ships completed payloads to the collector backend.
//!
//! The relay mirrors the process boundary of the original extension: the
//! scanning side hands a [`SyncMessage`] to a background coordinator task
//! over a channel and awaits a one-shot response, and the coordinator is
//! the only place that talks HTTP.
//!
//! # Architecture
//!
//! - [`Deliver`]: the delivery seam, so the coordinator can be exercised
//!   without a network
//! - [`HttpCollector`]: the production implementation, POSTing
//!   `{platform, data}` JSON to the collector endpoint
//! - [`run_coordinator`] / [`SyncHandle`]: the channel pair around the
//!   coordinator task
//!
//! # Failure policy
//!
//! Delivery failures (network error, non-2xx status, malformed response)
//! come back to the caller as distinct reason strings and are never retried
//! here; re-triggering a sync is the operator's call. The channel has
//! capacity one, so there is a single in-flight sync at any time.

use crate::models::{Payload, SyncMessage};
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, instrument, warn};

/// Delivery seam for the sync coordinator.
///
/// Implementors take a sync message and return the backend's status text,
/// or an error whose message is the user-facing failure reason.
pub trait Deliver {
    /// Deliver one sync message.
    async fn deliver(&self, message: &SyncMessage) -> Result<String, Box<dyn Error>>;
}

/// Request body for the collector endpoint: `{platform, data}`.
#[derive(Serialize)]
struct CollectRequest<'a> {
    platform: &'a str,
    data: &'a Payload,
}

/// Collector response; `message` becomes the user-facing status text.
#[derive(Deserialize)]
struct CollectResponse {
    message: String,
}

/// HTTP delivery to the collector backend.
#[derive(Debug, Clone)]
pub struct HttpCollector {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCollector {
    /// Build a collector client for `endpoint`.
    pub fn new(
        endpoint: String,
        timeout: Duration,
        user_agent: Option<String>,
    ) -> Result<Self, Box<dyn Error>> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        Ok(HttpCollector {
            client: builder.build()?,
            endpoint,
        })
    }
}

impl Deliver for HttpCollector {
    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint, platform = %message.platform))]
    async fn deliver(&self, message: &SyncMessage) -> Result<String, Box<dyn Error>> {
        let body = CollectRequest {
            platform: message.platform.as_str(),
            data: &message.data,
        };

        let response = match self.client.post(&self.endpoint).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "collector request failed");
                return Err(format!("network error: {e}").into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "collector rejected payload");
            return Err(format!("collector returned HTTP {}", status.as_u16()).into());
        }

        let text = response
            .text()
            .await
            .map_err(|e| format!("network error: {e}"))?;
        match serde_json::from_str::<CollectResponse>(&text) {
            Ok(parsed) => {
                info!(message = %parsed.message, "collector accepted payload");
                Ok(parsed.message)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    body = %truncate_for_log(&text, 200),
                    "collector response was not the expected JSON"
                );
                Err(format!("unexpected collector response: {e}").into())
            }
        }
    }
}

/// The response a sync caller gets back from the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResponse {
    /// Whether delivery succeeded.
    pub ok: bool,
    /// Backend status text on success; the failure reason otherwise.
    pub status: String,
}

/// One queued sync: the message plus the caller's reply slot.
#[derive(Debug)]
pub struct SyncRequest {
    /// The wrapped payload to deliver.
    pub message: SyncMessage,
    /// One-shot reply channel back to the caller.
    pub reply: oneshot::Sender<SyncResponse>,
}

/// Drain sync requests and deliver them one at a time.
///
/// Runs until every [`SyncHandle`] is dropped. Each request is answered
/// exactly once; a caller that went away is logged and skipped.
pub async fn run_coordinator<D: Deliver>(mut requests: mpsc::Receiver<SyncRequest>, deliverer: D) {
    while let Some(request) = requests.recv().await {
        let platform = request.message.platform;
        let response = match deliverer.deliver(&request.message).await {
            Ok(status) => {
                info!(%platform, %status, "payload delivered");
                SyncResponse { ok: true, status }
            }
            Err(e) => {
                error!(%platform, error = %e, "payload delivery failed");
                SyncResponse {
                    ok: false,
                    status: e.to_string(),
                }
            }
        };
        if request.reply.send(response).is_err() {
            warn!(%platform, "sync caller went away before the response arrived");
        }
    }
}

/// Caller-side handle to the sync coordinator.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: mpsc::Sender<SyncRequest>,
}

impl SyncHandle {
    /// Wrap the coordinator's request channel.
    pub fn new(tx: mpsc::Sender<SyncRequest>) -> Self {
        SyncHandle { tx }
    }

    /// Deliver one payload and wait for the coordinator's response.
    ///
    /// Never returns an error: coordinator-side and channel failures are
    /// folded into a failed [`SyncResponse`] with a reason string.
    pub async fn sync(&self, payload: Payload) -> SyncResponse {
        let (reply, response) = oneshot::channel();
        let message = SyncMessage::send_data(payload);
        let request = SyncRequest { message, reply };

        if self.tx.send(request).await.is_err() {
            return SyncResponse {
                ok: false,
                status: "sync coordinator is not running".to_string(),
            };
        }
        match response.await {
            Ok(response) => response,
            Err(_) => SyncResponse {
                ok: false,
                status: "sync coordinator dropped the request".to_string(),
            },
        }
    }
}
