//! Command-line interface definitions for course_sync.
//!
//! This module defines the CLI arguments and options using the `clap` crate.

use crate::models::Platform;
use clap::Parser;

/// Command-line arguments for the course_sync application.
///
/// # Examples
///
/// ```sh
/// # Scan a saved registrar page and deliver to the default collector
/// course_sync saved/classschedule.html --page-url https://reg.example.ac.th/registrar/class
///
/// # Scan a live Classroom page, print the payload instead of delivering
/// course_sync https://classroom.google.com/h --dry-run
///
/// # Force the platform and dump payload JSON for inspection
/// course_sync page.html -p registration --dump-dir ./dumps
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// HTML pages to scan: local file paths or http(s) URLs
    #[arg(required = true)]
    pub pages: Vec<String>,

    /// Force a platform instead of auto-detecting (classroom, teams, registration)
    #[arg(short, long)]
    pub platform: Option<Platform>,

    /// Logical URL for pages loaded from files, used by the applicability check
    #[arg(long)]
    pub page_url: Option<String>,

    /// Collector endpoint that receives scanned payloads
    #[arg(long, env = "COLLECTOR_URL")]
    pub collector_url: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print payloads to stdout instead of delivering them
    #[arg(long)]
    pub dry_run: bool,

    /// Directory for payload JSON dumps (one file per scan)
    #[arg(long)]
    pub dump_dir: Option<String>,
}
