//! # course_sync
//!
//! A course-data extraction pipeline that scans Google Classroom, Microsoft
//! Teams, and university registration portal pages, turns their markup into
//! structured records, and forwards the result to a collector backend.
//!
//! ## Features
//!
//! - Declarative per-platform adapter tables (selectors as data, not code)
//! - Per-record fallback and drop policies that never abort a page
//! - Schedule-line decomposition with verbatim `raw` fallback for lines
//!   that don't match the expected day/time shape
//! - Background sync coordinator delivering `{platform, data}` JSON over
//!   HTTP, one request in flight at a time, no automatic retries
//! - Payload JSON dumps and a dry-run mode for inspection
//!
//! ## Usage
//!
//! ```sh
//! course_sync saved/classschedule.html --page-url https://reg.example.ac.th/registrar/class
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Loading**: Read each input page (local file or live URL)
//! 2. **Selection**: Pick the platform adapter (forced or auto-detected)
//! 3. **Scanning**: Extract records in document order into one payload per page
//! 4. **Delivery**: Ship payloads through the sync coordinator (or dump/print)

use clap::Parser;
use futures::stream::{self, StreamExt};
use scraper::Html;
use std::error::Error;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod extract;
mod models;
mod outputs;
mod platforms;
mod relay;
mod utils;

use cli::Cli;
use config::{SyncConfig, load_config};
use extract::scanner::{scan, scan_document};
use models::Payload;
use platforms::{adapter_for, detect};
use relay::{HttpCollector, SyncHandle};
use utils::ensure_writable_dir;

/// One input page, loaded and ready to scan.
struct LoadedPage {
    /// The CLI argument this page came from (path or URL).
    location: String,
    /// Logical URL for the applicability check, when known.
    page_url: Option<String>,
    /// Raw page markup.
    html: String,
}

/// Load one page from a local file or a live URL.
///
/// For URL inputs the page URL is the input itself; for file inputs it is
/// the `--page-url` override, when given.
async fn load_page(
    location: String,
    url_override: Option<String>,
) -> Result<LoadedPage, Box<dyn Error>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let html = reqwest::get(&location).await?.text().await?;
        Ok(LoadedPage {
            page_url: Some(location.clone()),
            location,
            html,
        })
    } else {
        let html = tokio::fs::read_to_string(&location).await?;
        Ok(LoadedPage {
            page_url: url_override,
            location,
            html,
        })
    }
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("course_sync starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(pages = args.pages.len(), platform = ?args.platform, dry_run = args.dry_run, "Parsed CLI arguments");

    // --- Config: file first, CLI overrides on top ---
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path).await?,
        None => SyncConfig::default(),
    };
    if let Some(url) = &args.collector_url {
        config.collector_url = url.clone();
    }

    // Early check: ensure the dump dir is writable before any scan runs
    if let Some(dump_dir) = &args.dump_dir {
        if let Err(e) = ensure_writable_dir(dump_dir).await {
            error!(
                path = %dump_dir,
                error = %e,
                "Dump directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // --- Sync coordinator (not spawned for dry runs) ---
    let handle = if args.dry_run {
        None
    } else {
        let collector = HttpCollector::new(
            config.collector_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
            config.user_agent.clone(),
        )?;
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(relay::run_coordinator(rx, collector));
        info!(collector_url = %config.collector_url, "Sync coordinator started");
        Some(SyncHandle::new(tx))
    };

    // ---- Load pages (concurrently, input order preserved) ----
    const PARALLEL_PAGE_LOADS: usize = 4;

    let loaded: Vec<Option<LoadedPage>> = stream::iter(args.pages.clone())
        .map(|location| {
            let url_override = args.page_url.clone();
            async move {
                match load_page(location.clone(), url_override).await {
                    Ok(page) => {
                        debug!(%location, bytes = page.html.len(), "Loaded page");
                        Some(page)
                    }
                    Err(e) => {
                        error!(%location, error = %e, "Failed to load page");
                        None
                    }
                }
            }
        })
        .buffered(PARALLEL_PAGE_LOADS)
        .collect()
        .await;
    let pages: Vec<LoadedPage> = loaded.into_iter().flatten().collect();
    info!(count = pages.len(), "Pages loaded");

    // ---- Scan each page ----
    let mut payloads: Vec<(String, Payload)> = Vec::new();
    let mut unmatched_pages = 0usize;

    for page in &pages {
        // The parsed document stays inside this arm; payloads own
        // everything that crosses an await point.
        let payload = match args.platform {
            Some(platform) => Some(scan(&page.html, page.page_url.as_deref(), adapter_for(platform))?),
            None => {
                let document = Html::parse_document(&page.html);
                match detect(&document, page.page_url.as_deref()) {
                    Some(config) => {
                        Some(scan_document(&document, page.page_url.as_deref(), config)?)
                    }
                    None => None,
                }
            }
        };

        match payload {
            Some(payload) => {
                info!(
                    location = %page.location,
                    platform = %payload.platform,
                    records = payload.records.len(),
                    dropped = payload.diagnostics.records_dropped,
                    "Page scanned"
                );
                payloads.push((page.location.clone(), payload));
            }
            None => {
                warn!(location = %page.location, "No platform adapter matched; page skipped");
                unmatched_pages += 1;
            }
        }
    }

    let total_records: usize = payloads.iter().map(|(_, p)| p.records.len()).sum();
    let total_dropped: usize = payloads
        .iter()
        .map(|(_, p)| p.diagnostics.records_dropped)
        .sum();

    // ---- Dump and deliver ----
    let mut delivered = 0usize;
    let mut failed = 0usize;

    for (location, payload) in &payloads {
        if let Some(dump_dir) = &args.dump_dir {
            if let Err(e) = outputs::json::write_payload(payload, dump_dir).await {
                error!(%location, error = %e, "Failed to write payload dump");
            }
        }

        match &handle {
            Some(handle) => {
                // One sync in flight at a time; the next page waits for
                // this response before its delivery starts.
                let response = handle.sync(payload.clone()).await;
                if response.ok {
                    delivered += 1;
                    info!(%location, status = %response.status, "Sync complete");
                } else {
                    failed += 1;
                    warn!(%location, status = %response.status, "Sync failed; re-run to retry");
                }
            }
            None => {
                println!("{}", serde_json::to_string_pretty(payload)?);
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        pages = pages.len(),
        unmatched_pages,
        records = total_records,
        dropped = total_dropped,
        delivered,
        failed,
        ?elapsed,
        "Execution complete"
    );

    Ok(())
}
