//! Runtime configuration loaded from an optional YAML file.
//!
//! Only delivery-side settings live here; everything about what to scrape
//! is fixed in the platform adapter tables. Every field has a default so a
//! missing or partial config file still yields a usable setup, and the CLI
//! flags override whatever the file says.
//!
//! ```yaml
//! collector_url: "https://api.studyhub.example.com/api/scraped-data"
//! request_timeout_secs: 15
//! user_agent: "course_sync/0.1"
//! ```

use serde::Deserialize;
use std::error::Error;
use tracing::{info, instrument};

fn default_collector_url() -> String {
    "http://localhost:3030/api/scraped-data".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Delivery settings for the sync coordinator.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Collector endpoint that receives `{platform, data}` payloads.
    #[serde(default = "default_collector_url")]
    pub collector_url: String,
    /// Per-request timeout for collector calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Optional User-Agent header for collector calls.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            collector_url: default_collector_url(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: None,
        }
    }
}

/// Load configuration from a YAML file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn load_config(path: &str) -> Result<SyncConfig, Box<dyn Error>> {
    let text = tokio::fs::read_to_string(path).await?;
    let config: SyncConfig = serde_yaml::from_str(&text)?;
    info!(collector_url = %config.collector_url, "Loaded configuration");
    Ok(config)
}
