//! Output generation for payload inspection.
//!
//! The relay is the real delivery path; the [`json`] submodule only writes
//! local payload dumps so an operator can inspect what a scan extracted
//! (including the `raw` schedule fallbacks and drop counts) before
//! re-triggering a sync.
//!
//! ```text
//! dump_dir/
//! └── 2026-08-06/
//!     ├── classroom_101530211.json
//!     └── registration_101530834.json
//! ```

pub mod json;
