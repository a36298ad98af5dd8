//! Page scanning: every matching container on a page, in document order.
//!
//! A scan is a single synchronous pass over one parsed document. Before
//! touching any container the scanner runs the platform's applicability
//! check (URL shape plus a structural marker element); a page that fails
//! the check yields an empty payload carrying the reason, so unrelated
//! markup is never scanned by accident.
//!
//! Record order in the payload matches the document order of the matching
//! containers. There are no retries: partial failures stay confined to the
//! record builder's per-container drop policy.

use crate::extract::field::ExtractionRule;
use crate::extract::record::{NestedRule, RecordRules, build_record};
use crate::models::{Payload, Platform};
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, info, instrument};
use url::Url;

/// The page-applicability predicate of one platform adapter.
///
/// The URL checks only apply when the caller knows the page's URL; pages
/// loaded from saved files without a `--page-url` are judged by the marker
/// alone.
#[derive(Debug, Clone, Copy)]
pub struct Applicability {
    /// Expected host, or a suffix of it (`classroom.google.com` accepts
    /// `classroom.google.com` and any subdomain).
    pub host_suffix: Option<&'static str>,
    /// Expected URL path prefix.
    pub path_prefix: Option<&'static str>,
    /// A selector that must match somewhere in the document.
    pub marker: &'static str,
}

/// One platform's declarative scan configuration: the applicability
/// predicate, the container selector, and the ordered field rules.
#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
    /// The platform this configuration scans.
    pub platform: Platform,
    /// When to scan a page at all.
    pub applicability: Applicability,
    /// Selector for the per-record container elements.
    pub container: &'static str,
    /// Ordered top-level field rules.
    pub fields: &'static [ExtractionRule],
    /// Nested sub-record rules (empty for flat platforms).
    pub nested: &'static [NestedRule],
}

/// Check whether a page belongs to this configuration's platform.
///
/// Returns a human-readable reason on mismatch; the reason ends up in the
/// payload diagnostics (or the auto-detection debug log) untouched.
pub fn check_applicability(
    document: &Html,
    page_url: Option<&str>,
    config: &ScanConfig,
) -> Result<(), String> {
    let applicability = &config.applicability;

    if let Some(raw) = page_url {
        let parsed =
            Url::parse(raw).map_err(|e| format!("page URL {raw:?} did not parse: {e}"))?;
        if let Some(suffix) = applicability.host_suffix {
            let host = parsed.host_str().unwrap_or("");
            if host != suffix && !host.ends_with(&format!(".{suffix}")) {
                return Err(format!("host {host:?} does not match {suffix:?}"));
            }
        }
        if let Some(prefix) = applicability.path_prefix {
            if !parsed.path().starts_with(prefix) {
                return Err(format!(
                    "path {:?} is outside {prefix:?}",
                    parsed.path()
                ));
            }
        }
    }

    let marker = Selector::parse(applicability.marker)
        .map_err(|e| format!("invalid marker selector {:?}: {e}", applicability.marker))?;
    if document.select(&marker).next().is_none() {
        return Err(format!("page marker {:?} not found", applicability.marker));
    }

    Ok(())
}

/// Scan a raw HTML page with one platform configuration.
pub fn scan(
    html: &str,
    page_url: Option<&str>,
    config: &ScanConfig,
) -> Result<Payload, Box<dyn Error>> {
    let document = Html::parse_document(html);
    scan_document(&document, page_url, config)
}

/// Scan an already-parsed document with one platform configuration.
///
/// Containers are visited in document order and that order is preserved in
/// the payload's record list. Containers dropped by the record builder are
/// counted in the payload diagnostics.
#[instrument(level = "info", skip_all, fields(platform = %config.platform))]
pub fn scan_document(
    document: &Html,
    page_url: Option<&str>,
    config: &ScanConfig,
) -> Result<Payload, Box<dyn Error>> {
    if let Err(reason) = check_applicability(document, page_url, config) {
        info!(%reason, "page not applicable; returning empty payload");
        return Ok(Payload::skipped(config.platform, page_url, reason));
    }

    let container = Selector::parse(config.container)?;
    let rules = RecordRules::compile(config.fields, config.nested)?;

    let mut payload = Payload::new(config.platform, page_url);
    for element in document.select(&container) {
        payload.diagnostics.containers_seen += 1;
        match build_record(element, &rules) {
            Some(record) => payload.records.push(record),
            None => payload.diagnostics.records_dropped += 1,
        }
    }

    debug!(
        containers = payload.diagnostics.containers_seen,
        dropped = payload.diagnostics.records_dropped,
        "container pass finished"
    );
    info!(
        records = payload.records.len(),
        dropped = payload.diagnostics.records_dropped,
        "scan complete"
    );
    Ok(payload)
}
