//! Microsoft Teams adapter: class team cards from the school teams grid.

use crate::extract::field::{ExtractionRule, FieldDefault, Normalize};
use crate::extract::scanner::{Applicability, ScanConfig};
use crate::models::Platform;

static FIELDS: [ExtractionRule; 3] = [
    ExtractionRule {
        name: "name",
        selector: ".team-name",
        attribute: None,
        normalize: Normalize::Text,
        required: true,
        default: FieldDefault::EmptyText,
    },
    ExtractionRule {
        name: "description",
        selector: ".team-description",
        attribute: None,
        normalize: Normalize::Text,
        required: false,
        default: FieldDefault::EmptyText,
    },
    ExtractionRule {
        name: "team_id",
        selector: "a.team-open",
        attribute: Some("data-team-id"),
        normalize: Normalize::Text,
        required: false,
        default: FieldDefault::Null,
    },
];

/// Scan configuration for the Teams school-teams grid.
pub static CONFIG: ScanConfig = ScanConfig {
    platform: Platform::Teams,
    applicability: Applicability {
        host_suffix: Some("teams.microsoft.com"),
        path_prefix: None,
        marker: ".school-teams",
    },
    container: ".school-teams .team-card",
    fields: &FIELDS,
    nested: &[],
};
