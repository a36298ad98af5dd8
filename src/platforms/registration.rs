//! Registration portal adapter.
//!
//! Scans the enrolled-course table on the university registrar site. The
//! portal renders one `<tr>` per course with bare `<td>` cells, so the
//! field rules address columns by position rather than by class. Schedule
//! and room cells pack several lines into one cell with `<br>` markup;
//! the schedule cell is decomposed into day/time/type entries and the room
//! cell is kept as a list of lines.
//!
//! Column layout:
//!
//! | # | Cell | Field | Normalization |
//! |---|------|-------|---------------|
//! | 1 | Ordinal | `no` | Integer (null on parse failure) |
//! | 2 | Course code | `code` | Text, required |
//! | 3 | Course title | `name` | Text, required |
//! | 4 | Credits | `credits` | Text |
//! | 5 | Section | `section` | Text |
//! | 6 | Schedule | `schedule` | Schedule entries, raw fallback per line |
//! | 7 | Room | `room` | Lines |

use crate::extract::field::{ExtractionRule, FieldDefault, Normalize};
use crate::extract::scanner::{Applicability, ScanConfig};
use crate::models::Platform;

static FIELDS: [ExtractionRule; 7] = [
    ExtractionRule {
        name: "no",
        selector: "td:nth-child(1)",
        attribute: None,
        normalize: Normalize::Integer,
        required: false,
        default: FieldDefault::Null,
    },
    ExtractionRule {
        name: "code",
        selector: "td:nth-child(2)",
        attribute: None,
        normalize: Normalize::Text,
        required: true,
        default: FieldDefault::EmptyText,
    },
    ExtractionRule {
        name: "name",
        selector: "td:nth-child(3)",
        attribute: None,
        normalize: Normalize::Text,
        required: true,
        default: FieldDefault::EmptyText,
    },
    ExtractionRule {
        name: "credits",
        selector: "td:nth-child(4)",
        attribute: None,
        normalize: Normalize::Text,
        required: false,
        default: FieldDefault::EmptyText,
    },
    ExtractionRule {
        name: "section",
        selector: "td:nth-child(5)",
        attribute: None,
        normalize: Normalize::Text,
        required: false,
        default: FieldDefault::EmptyText,
    },
    ExtractionRule {
        name: "schedule",
        selector: "td:nth-child(6)",
        attribute: None,
        normalize: Normalize::Schedule,
        required: false,
        default: FieldDefault::EmptyList,
    },
    ExtractionRule {
        name: "room",
        selector: "td:nth-child(7)",
        attribute: None,
        normalize: Normalize::Lines,
        required: false,
        default: FieldDefault::EmptyList,
    },
];

/// Scan configuration for the registrar's enrolled-course table.
pub static CONFIG: ScanConfig = ScanConfig {
    platform: Platform::Registration,
    applicability: Applicability {
        host_suffix: None,
        path_prefix: Some("/registrar"),
        marker: "table.course-table",
    },
    container: "table.course-table tr.course-row",
    fields: &FIELDS,
    nested: &[],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::scanner::scan;
    use serde_json::json;

    const PAGE: &str = r#"
        <table class="course-table">
          <tr class="course-header"><th>No.</th><th>Code</th><th>Title</th></tr>
          <tr class="course-row">
            <td>1</td>
            <td>2110101</td>
            <td>Computer  Programming</td>
            <td>3</td>
            <td>2</td>
            <td>Mon 08:00-10:00 น.(ท)<br>Wed 08:00-10:00 น.(ป)</td>
            <td>ENG 304<br>ENG Lab 2</td>
          </tr>
          <tr class="course-row">
            <td>-</td>
            <td>5500208</td>
            <td>Academic English</td>
            <td>3</td>
            <td>18</td>
            <td>TBD</td>
            <td></td>
          </tr>
        </table>
    "#;

    #[test]
    fn test_scan_course_table() {
        let payload = scan(
            PAGE,
            Some("https://reg.example.ac.th/registrar/classschedule"),
            &CONFIG,
        )
        .unwrap();
        assert_eq!(payload.records.len(), 2);

        let first = &payload.records[0];
        assert_eq!(first.get("no"), Some(&json!(1)));
        assert_eq!(first.get("code"), Some(&json!("2110101")));
        assert_eq!(first.get("name"), Some(&json!("Computer Programming")));
        assert_eq!(
            first.get("schedule"),
            Some(&json!([
                {"day": "Mon", "time": "08:00-10:00", "type": "ท"},
                {"day": "Wed", "time": "08:00-10:00", "type": "ป"}
            ]))
        );
        assert_eq!(first.get("room"), Some(&json!(["ENG 304", "ENG Lab 2"])));

        let second = &payload.records[1];
        // "-" is not a number; the sentinel is null, not an error.
        assert_eq!(second.get("no"), Some(&serde_json::Value::Null));
        assert_eq!(second.get("schedule"), Some(&json!([{"raw": "TBD"}])));
        assert_eq!(second.get("room"), Some(&json!([])));
    }

    #[test]
    fn test_header_row_not_scanned() {
        let payload = scan(
            PAGE,
            Some("https://reg.example.ac.th/registrar/classschedule"),
            &CONFIG,
        )
        .unwrap();
        assert_eq!(payload.diagnostics.containers_seen, 2);
        assert_eq!(payload.diagnostics.records_dropped, 0);
    }

    #[test]
    fn test_wrong_path_rejected() {
        let payload = scan(PAGE, Some("https://reg.example.ac.th/library/"), &CONFIG).unwrap();
        assert!(payload.records.is_empty());
        assert!(payload.diagnostics.skipped.unwrap().contains("/registrar"));
    }
}
