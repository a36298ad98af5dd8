//! Record building: one structured record per container element.
//!
//! The builder runs an ordered list of [`ExtractionRule`]s against a
//! container, then recurses into nested containers (e.g. the assignment
//! blocks inside a course card) with their own rule sets. The resulting
//! sub-records are attached as a list under the nested rule's name.
//!
//! # Drop policy
//!
//! A container missing a required field produces no record at all; the
//! scanner counts the drop in the payload diagnostics instead of aborting
//! the page. Nested containers follow the same rule locally: a nested
//! block missing a required field is left out of the sub-list without
//! taking the parent record down with it.

use crate::extract::field::{CompiledRule, ExtractionRule, extract_field};
use crate::models::Record;
use scraper::{ElementRef, Selector};
use serde_json::Value;
use std::error::Error;
use tracing::debug;

/// A declarative rule for a list of sub-records nested inside a container.
#[derive(Debug, Clone, Copy)]
pub struct NestedRule {
    /// Sub-key the list of sub-records is attached under.
    pub name: &'static str,
    /// Selector for the nested containers, scoped to the parent container.
    pub container: &'static str,
    /// Ordered field rules run once per nested container.
    pub fields: &'static [ExtractionRule],
}

struct CompiledNested {
    name: &'static str,
    container: Selector,
    fields: Vec<CompiledRule>,
}

/// The compiled rule set for one record shape: ordered top-level fields
/// plus any nested sub-record rules. Compiled once per scan pass.
pub struct RecordRules {
    fields: Vec<CompiledRule>,
    nested: Vec<CompiledNested>,
}

impl RecordRules {
    /// Parse every selector in the given rule tables.
    pub fn compile(
        fields: &'static [ExtractionRule],
        nested: &'static [NestedRule],
    ) -> Result<Self, Box<dyn Error>> {
        let fields = fields
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let nested = nested
            .iter()
            .map(|rule| {
                Ok(CompiledNested {
                    name: rule.name,
                    container: Selector::parse(rule.container)?,
                    fields: rule
                        .fields
                        .iter()
                        .map(CompiledRule::compile)
                        .collect::<Result<Vec<_>, _>>()?,
                })
            })
            .collect::<Result<Vec<_>, Box<dyn Error>>>()?;
        Ok(RecordRules { fields, nested })
    }
}

/// Run the ordered field rules against one container.
///
/// Returns `None` as soon as a required field is absent; optional misses
/// insert the rule's declared default instead.
fn build_fields(container: ElementRef<'_>, rules: &[CompiledRule]) -> Option<Record> {
    let mut record = Record::default();
    for compiled in rules {
        let rule = compiled.rule;
        match extract_field(container, compiled) {
            Some(value) => record.insert(rule.name, value),
            None if rule.required => {
                debug!(field = rule.name, "dropping container: required field missing");
                return None;
            }
            None => record.insert(rule.name, rule.default.value()),
        }
    }
    Some(record)
}

/// Build one record from one container element.
///
/// Nested rules run after the top-level fields: each nested container gets
/// its own field pass, and the resulting records land as a JSON array under
/// the nested rule's name (an empty array when nothing matches).
pub fn build_record(container: ElementRef<'_>, rules: &RecordRules) -> Option<Record> {
    let mut record = build_fields(container, &rules.fields)?;

    for nested in &rules.nested {
        let mut children = Vec::new();
        for child in container.select(&nested.container) {
            match build_fields(child, &nested.fields) {
                Some(sub) => children.push(Value::Object(sub.fields)),
                None => {
                    debug!(nested = nested.name, "skipping nested container: required field missing");
                }
            }
        }
        record.insert(nested.name, Value::Array(children));
    }

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::field::{FieldDefault, Normalize};
    use scraper::Html;
    use serde_json::json;

    static COURSE_FIELDS: [ExtractionRule; 3] = [
        ExtractionRule {
            name: "name",
            selector: ".course-name",
            attribute: None,
            normalize: Normalize::Text,
            required: true,
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
            name: "no",
            selector: ".course-no",
            attribute: None,
            normalize: Normalize::Integer,
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

    fn card(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn build(document: &Html, rules: &RecordRules) -> Option<Record> {
        let selector = Selector::parse(".course-card").unwrap();
        let container = document.select(&selector).next().unwrap();
        build_record(container, rules)
    }

    #[test]
    fn test_build_record_with_defaults() {
        let rules = RecordRules::compile(&COURSE_FIELDS, &[]).unwrap();
        let document = card(
            "<div class=\"course-card\"><h2 class=\"course-name\"> Physics  I </h2></div>",
        );
        let record = build(&document, &rules).unwrap();
        assert_eq!(record.get("name"), Some(&json!("Physics I")));
        assert_eq!(record.get("teacher"), Some(&json!("")));
        assert_eq!(record.get("no"), Some(&Value::Null));
    }

    #[test]
    fn test_required_miss_drops_container() {
        let rules = RecordRules::compile(&COURSE_FIELDS, &[]).unwrap();
        let document = card(
            "<div class=\"course-card\"><span class=\"course-teacher\">A. Sukon</span></div>",
        );
        assert!(build(&document, &rules).is_none());
    }

    #[test]
    fn test_integer_field_sentinel_inside_record() {
        let rules = RecordRules::compile(&COURSE_FIELDS, &[]).unwrap();
        let document = card(
            "<div class=\"course-card\">\
               <h2 class=\"course-name\">Chem</h2>\
               <span class=\"course-no\">n/a</span>\
             </div>",
        );
        let record = build(&document, &rules).unwrap();
        assert_eq!(record.get("no"), Some(&Value::Null));
    }

    #[test]
    fn test_nested_records_attached_in_order() {
        let rules = RecordRules::compile(&COURSE_FIELDS, &NESTED).unwrap();
        let document = card(
            "<div class=\"course-card\">\
               <h2 class=\"course-name\">Biology</h2>\
               <li class=\"assignment-item\">\
                 <span class=\"assignment-title\">Lab report</span>\
                 <span class=\"assignment-due\">Friday</span>\
               </li>\
               <li class=\"assignment-item\">\
                 <span class=\"assignment-title\">Reading quiz</span>\
               </li>\
             </div>",
        );
        let record = build(&document, &rules).unwrap();
        assert_eq!(
            record.get("assignments"),
            Some(&json!([
                {"title": "Lab report", "due": "Friday"},
                {"title": "Reading quiz", "due": ""}
            ]))
        );
    }

    #[test]
    fn test_nested_required_miss_skips_child_only() {
        let rules = RecordRules::compile(&COURSE_FIELDS, &NESTED).unwrap();
        let document = card(
            "<div class=\"course-card\">\
               <h2 class=\"course-name\">Biology</h2>\
               <li class=\"assignment-item\"><span class=\"assignment-due\">Friday</span></li>\
               <li class=\"assignment-item\">\
                 <span class=\"assignment-title\">Kept</span>\
               </li>\
             </div>",
        );
        let record = build(&document, &rules).unwrap();
        assert_eq!(
            record.get("assignments"),
            Some(&json!([{"title": "Kept", "due": ""}]))
        );
    }

    #[test]
    fn test_no_nested_matches_yields_empty_list() {
        let rules = RecordRules::compile(&COURSE_FIELDS, &NESTED).unwrap();
        let document =
            card("<div class=\"course-card\"><h2 class=\"course-name\">Maths</h2></div>");
        let record = build(&document, &rules).unwrap();
        assert_eq!(record.get("assignments"), Some(&json!([])));
    }
}
