//! Google Classroom adapter.
//!
//! Scans the class-list page at `classroom.google.com`. Each course card
//! contributes one record: name, section, teacher, the card's link, and a
//! nested list of the assignment items visible on the card.
//!
//! Course name is the only required field; cards without one (archive
//! placeholders, loading skeletons) are dropped and counted.

use crate::extract::field::{ExtractionRule, FieldDefault, Normalize};
use crate::extract::record::NestedRule;
use crate::extract::scanner::{Applicability, ScanConfig};
use crate::models::Platform;

static FIELDS: [ExtractionRule; 4] = [
    ExtractionRule {
        name: "name",
        selector: ".course-name",
        attribute: None,
        normalize: Normalize::Text,
        required: true,
        default: FieldDefault::EmptyText,
    },
    ExtractionRule {
        name: "section",
        selector: ".course-section",
        attribute: None,
        normalize: Normalize::Text,
        required: false,
        default: FieldDefault::EmptyText,
    },
    ExtractionRule {
        name: "teacher",
        selector: ".course-teacher",
        attribute: None,
        normalize: Normalize::Text,
        required: false,
        default: FieldDefault::EmptyText,
    },
    ExtractionRule {
        name: "link",
        selector: "a.course-link",
        attribute: Some("href"),
        normalize: Normalize::Text,
        required: false,
        default: FieldDefault::Null,
    },
];

static ASSIGNMENT_FIELDS: [ExtractionRule; 2] = [
    ExtractionRule {
        name: "title",
        selector: ".assignment-title",
        attribute: None,
        normalize: Normalize::Text,
        required: true,
        default: FieldDefault::EmptyText,
    },
    // Due dates stay as page text ("Due tomorrow", "11 Aug"); resolving the
    // relative forms needs the backend's timezone convention first.
    ExtractionRule {
        name: "due",
        selector: ".assignment-due",
        attribute: None,
        normalize: Normalize::Text,
        required: false,
        default: FieldDefault::EmptyText,
    },
];

static NESTED: [NestedRule; 1] = [NestedRule {
    name: "assignments",
    container: ".assignment-item",
    fields: &ASSIGNMENT_FIELDS,
}];

/// Scan configuration for the Classroom class list.
pub static CONFIG: ScanConfig = ScanConfig {
    platform: Platform::Classroom,
    applicability: Applicability {
        host_suffix: Some("classroom.google.com"),
        path_prefix: None,
        marker: ".course-list",
    },
    container: ".course-list .course-card",
    fields: &FIELDS,
    nested: &NESTED,
};
