//! Data models for scanned course data and the sync message contract.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Platform`]: The supported course-data sources
//! - [`Record`]: One extracted record (a course, a class team, a registration row)
//! - [`ScheduleEntry`]: A decomposed day/time/type triple from free-text schedule lines
//! - [`Payload`]: The full result of one page scan, handed to the transport relay
//! - [`SyncMessage`]: The message envelope understood by the sync coordinator
//!
//! Every scan produces a fresh [`Payload`]; nothing here is cached or shared
//! between scans.

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A course-data source supported by the scanner.
///
/// Each platform has a matching adapter configuration in [`crate::platforms`].
/// The enum serializes to the lowercase name used on the wire
/// (`"classroom"`, `"teams"`, `"registration"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Google Classroom course cards.
    Classroom,
    /// Microsoft Teams class teams.
    Teams,
    /// University registration portal course table.
    Registration,
}

impl Platform {
    /// All platforms, in the order auto-detection probes them.
    pub const ALL: [Platform; 3] = [Platform::Classroom, Platform::Teams, Platform::Registration];

    /// The lowercase wire name of this platform.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Classroom => "classroom",
            Platform::Teams => "teams",
            Platform::Registration => "registration",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classroom" => Ok(Platform::Classroom),
            "teams" => Ok(Platform::Teams),
            "registration" => Ok(Platform::Registration),
            other => Err(format!(
                "unknown platform {other:?} (expected classroom, teams, or registration)"
            )),
        }
    }
}

/// One extracted record: a mapping from field name to extracted value.
///
/// Values are JSON values so a record can hold plain strings, integers,
/// nulls (the sentinel for unparsable numeric fields), and nested lists of
/// sub-records such as assignments or schedule entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    /// Field name to extracted value.
    pub fields: Map<String, Value>,
}

impl Record {
    /// Insert a field value under `name`.
    pub fn insert(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    /// Look up a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Matches schedule lines like `Mon 08:00-10:00 น.(ท)`: a day token, an
/// HH:MM-HH:MM range, the portal's clock suffix, and an optional
/// single-character session type in parentheses.
static SCHEDULE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\p{L}+)\s+(\d{1,2}:\d{2}-\d{1,2}:\d{2})(?:\s*น\.)?(?:\s*\((\S)\))?$")
        .expect("schedule line pattern")
});

/// A single decomposed schedule line.
///
/// The `type` field carries the portal's one-character session code
/// (lecture/lab), or the empty string when the line has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Day token exactly as it appears on the page (`Mon`, `จ`, ...).
    pub day: String,
    /// Time range in `HH:MM-HH:MM` form.
    pub time: String,
    /// One-character session code, or empty when absent.
    #[serde(rename = "type")]
    pub kind: String,
}

impl ScheduleEntry {
    /// Decompose one normalized schedule line.
    ///
    /// Returns `None` when the line does not match the expected shape; the
    /// caller is responsible for preserving such lines verbatim rather than
    /// dropping them.
    pub fn parse(line: &str) -> Option<ScheduleEntry> {
        let caps = SCHEDULE_LINE.captures(line)?;
        Some(ScheduleEntry {
            day: caps[1].to_string(),
            time: caps[2].to_string(),
            kind: caps
                .get(3)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        })
    }
}

/// Per-scan bookkeeping attached to every [`Payload`].
///
/// Local extraction problems never abort a scan; they are absorbed into
/// these counters so partial results stay inspectable downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanDiagnostics {
    /// Number of container elements the scanner visited.
    pub containers_seen: usize,
    /// Containers dropped because a required field was missing.
    pub records_dropped: usize,
    /// Set when the page failed the applicability check and no scan ran.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub skipped: Option<String>,
}

/// The full result of one page scan, scoped to one platform.
///
/// A payload is created fresh per scan invocation and handed straight to
/// the transport relay; the extractor never persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// The platform this scan targeted.
    pub platform: Platform,
    /// Logical URL of the scanned page, when known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page_url: Option<String>,
    /// Local RFC 3339 timestamp taken when the scan started.
    pub scanned_at: String,
    /// Extracted records in document order.
    pub records: Vec<Record>,
    /// Scan bookkeeping: containers visited, drops, skip reason.
    pub diagnostics: ScanDiagnostics,
}

impl Payload {
    /// Create an empty payload for a scan that is about to run.
    pub fn new(platform: Platform, page_url: Option<&str>) -> Self {
        Payload {
            platform,
            page_url: page_url.map(str::to_string),
            scanned_at: Local::now().to_rfc3339(),
            records: Vec::new(),
            diagnostics: ScanDiagnostics::default(),
        }
    }

    /// Create the empty payload returned when a page fails the
    /// applicability check. `reason` must name what did not match.
    pub fn skipped(platform: Platform, page_url: Option<&str>, reason: String) -> Self {
        let mut payload = Payload::new(platform, page_url);
        payload.diagnostics.skipped = Some(reason);
        payload
    }
}

/// The message envelope the scanner hands to the sync coordinator.
///
/// Mirrors the runtime message contract of the original extension:
/// `{action: "sendDataToBackend", platform, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMessage {
    /// Always `"sendDataToBackend"` for scan payloads.
    pub action: String,
    /// The platform the payload was scanned from.
    pub platform: Platform,
    /// The scan result being forwarded.
    pub data: Payload,
}

impl SyncMessage {
    /// Wrap a scan payload in the sync envelope.
    pub fn send_data(payload: Payload) -> Self {
        SyncMessage {
            action: "sendDataToBackend".to_string(),
            platform: payload.platform,
            data: payload,
        }
    }
}
