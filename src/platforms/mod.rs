//! Platform adapters: declarative scraping configuration per course-data source.
//!
//! Each submodule exports one static [`ScanConfig`] table: an applicability
//! predicate, a container selector, and ordered field rules. There is no
//! adapter trait to implement; supporting a new platform means adding a new
//! table and wiring it into [`adapter_for`] and [`Platform::ALL`].
//!
//! # Supported platforms
//!
//! | Platform | Module | Page | Notes |
//! |----------|--------|------|-------|
//! | Google Classroom | [`classroom`] | Class list | Course cards with nested assignment items |
//! | Microsoft Teams | [`teams`] | School teams grid | Class team cards, flat |
//! | Registration portal | [`registration`] | Enrolled-course table | Rows with multi-line schedule/room cells |
//!
//! Selectors live here as data, not in code paths; when a platform changes
//! its markup, the fix is an edit to one table.

pub mod classroom;
pub mod registration;
pub mod teams;

use crate::extract::scanner::{ScanConfig, check_applicability};
use crate::models::Platform;
use scraper::Html;
use tracing::debug;

/// Look up the scan configuration for a platform.
pub fn adapter_for(platform: Platform) -> &'static ScanConfig {
    match platform {
        Platform::Classroom => &classroom::CONFIG,
        Platform::Teams => &teams::CONFIG,
        Platform::Registration => &registration::CONFIG,
    }
}

/// Find the first platform whose applicability predicate accepts this page.
///
/// Platforms are probed in [`Platform::ALL`] order. Returns `None` when no
/// adapter matches, so callers can report the page as unrecognized instead
/// of scanning arbitrary markup.
pub fn detect(document: &Html, page_url: Option<&str>) -> Option<&'static ScanConfig> {
    Platform::ALL.iter().find_map(|platform| {
        let config = adapter_for(*platform);
        match check_applicability(document, page_url, config) {
            Ok(()) => Some(config),
            Err(reason) => {
                debug!(%platform, %reason, "adapter not applicable");
                None
            }
        }
    })
}
