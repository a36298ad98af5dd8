//! Field extraction: one structured value out of one DOM container.
//!
//! An [`ExtractionRule`] pairs a CSS selector with a normalization policy
//! and a documented fallback. Rules are plain data so platform adapters can
//! declare them in static tables; [`CompiledRule`] is the parsed form a
//! scan pass actually runs.
//!
//! Selectors are resolved with [`scraper::ElementRef::select`], which only
//! walks the container's subtree. Scoping extraction to the container is
//! what keeps repeated page structures from contaminating each other's
//! records.

use crate::models::ScheduleEntry;
use crate::utils::{logical_lines, normalize_ws};
use scraper::{ElementRef, Node, Selector};
use serde_json::{Value, json};
use std::error::Error;
use tracing::warn;

/// How a field's raw text becomes its extracted value.
///
/// This is the explicit, per-field replacement for the source markup's
/// implicit `text || default` fallback chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    /// Collapse all whitespace into single spaces; value is a string.
    Text,
    /// Split into logical lines (one per `<br>`); value is a string array.
    Lines,
    /// Parse as a base-10 integer; a parse failure yields JSON `null`
    /// rather than an error, and consumers must tolerate the null.
    Integer,
    /// Decompose each logical line into a schedule entry, keeping
    /// unmatched lines verbatim as `{"raw": line}` objects.
    Schedule,
}

impl Normalize {
    /// Apply this policy to the raw extracted text.
    pub fn apply(self, raw: &str) -> Value {
        match self {
            Normalize::Text => Value::String(normalize_ws(raw)),
            Normalize::Lines => Value::Array(
                logical_lines(raw).into_iter().map(Value::String).collect(),
            ),
            Normalize::Integer => match normalize_ws(raw).parse::<i64>() {
                Ok(n) => json!(n),
                Err(_) => Value::Null,
            },
            Normalize::Schedule => Value::Array(
                logical_lines(raw)
                    .iter()
                    .map(|line| schedule_line_value(line))
                    .collect(),
            ),
        }
    }
}

/// Decompose one schedule line, falling back to `{"raw": line}` when the
/// line does not match the expected day/time shape. Lossy inputs must stay
/// visible downstream, so unmatched lines are never dropped.
pub fn schedule_line_value(line: &str) -> Value {
    match ScheduleEntry::parse(line) {
        Some(entry) => json!({"day": entry.day, "time": entry.time, "type": entry.kind}),
        None => json!({"raw": line}),
    }
}

/// The value an optional field takes when its selector matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Empty string, for plain text fields.
    EmptyText,
    /// JSON null, for numeric and attribute fields.
    Null,
    /// Empty array, for line and schedule fields.
    EmptyList,
}

impl FieldDefault {
    /// The concrete fallback value.
    pub fn value(self) -> Value {
        match self {
            FieldDefault::EmptyText => Value::String(String::new()),
            FieldDefault::Null => Value::Null,
            FieldDefault::EmptyList => Value::Array(Vec::new()),
        }
    }
}

/// One declarative field rule inside a platform adapter table.
///
/// The selector is scoped to the record's container element, never the
/// whole document. When it matches several elements, the first match in
/// document order wins; page markup changes without notice, so that
/// tie-break has to stay deterministic.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRule {
    /// Field name in the output record.
    pub name: &'static str,
    /// CSS selector, resolved within the container subtree.
    pub selector: &'static str,
    /// Extract this attribute of the matched element instead of its text.
    pub attribute: Option<&'static str>,
    /// Normalization applied to the raw text or attribute value.
    pub normalize: Normalize,
    /// Required fields drop the whole container when absent.
    pub required: bool,
    /// Fallback value for optional fields that match nothing.
    pub default: FieldDefault,
}

/// An [`ExtractionRule`] with its selector parsed, ready to run.
pub struct CompiledRule {
    /// The source rule from the adapter table.
    pub rule: &'static ExtractionRule,
    selector: Selector,
}

impl CompiledRule {
    /// Parse the rule's selector.
    ///
    /// Selector syntax errors are configuration bugs in an adapter table,
    /// so they surface as hard errors instead of per-record fallbacks.
    pub fn compile(rule: &'static ExtractionRule) -> Result<Self, Box<dyn Error>> {
        let selector = Selector::parse(rule.selector)?;
        Ok(CompiledRule { rule, selector })
    }
}

/// Extract the text of `element`, converting `<br>` elements into explicit
/// `\n` separators.
///
/// Incidental whitespace in text nodes (source indentation, wrapped
/// attribute lines) is flattened to spaces so that after this pass `\n`
/// means exactly one thing: the markup contained a line break. Collapsing
/// everything indiscriminately would fuse multi-line schedule and room
/// cells into one unparsable string.
pub fn text_with_breaks(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(&text.replace(['\n', '\r'], " ")),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

/// Run one compiled rule against one container element.
///
/// Returns `None` when the selector (or the requested attribute) matches
/// nothing; the caller decides between the rule's default and dropping the
/// record. A miss on a required field logs a warning here so every skipped
/// container leaves a trace.
pub fn extract_field(container: ElementRef<'_>, compiled: &CompiledRule) -> Option<Value> {
    let rule = compiled.rule;
    let Some(element) = container.select(&compiled.selector).next() else {
        if rule.required {
            warn!(
                field = rule.name,
                selector = rule.selector,
                "required field selector matched nothing"
            );
        }
        return None;
    };

    let raw = match rule.attribute {
        Some(attr) => match element.value().attr(attr) {
            Some(value) => value.to_string(),
            None => {
                if rule.required {
                    warn!(
                        field = rule.name,
                        selector = rule.selector,
                        attribute = attr,
                        "matched element is missing the required attribute"
                    );
                }
                return None;
            }
        },
        None => text_with_breaks(element),
    };

    Some(rule.normalize.apply(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_container<'a>(document: &'a Html, selector: &Selector) -> ElementRef<'a> {
        document.select(selector).next().unwrap()
    }

    #[test]
    fn test_text_with_breaks_preserves_line_structure() {
        let document = Html::parse_document(
            "<div class=\"schedule\">Mon 08:00-10:00 น.(ท)<br>Fri 13:00-15:00 น.</div>",
        );
        let selector = Selector::parse(".schedule").unwrap();
        let cell = first_container(&document, &selector);
        assert_eq!(
            logical_lines(&text_with_breaks(cell)),
            vec!["Mon 08:00-10:00 น.(ท)", "Fri 13:00-15:00 น."]
        );
    }

    #[test]
    fn test_text_with_breaks_flattens_source_newlines() {
        // Pretty-printed markup: the only logical line break is the <br>.
        let document = Html::parse_document(
            "<div class=\"room\">\n    Building 4\n    Room 402<br>\n    Online\n</div>",
        );
        let selector = Selector::parse(".room").unwrap();
        let cell = first_container(&document, &selector);
        assert_eq!(
            logical_lines(&text_with_breaks(cell)),
            vec!["Building 4 Room 402", "Online"]
        );
    }

    #[test]
    fn test_normalize_integer_sentinel() {
        assert_eq!(Normalize::Integer.apply(" 7 "), json!(7));
        assert_eq!(Normalize::Integer.apply("seven"), Value::Null);
        assert_eq!(Normalize::Integer.apply(""), Value::Null);
    }

    #[test]
    fn test_normalize_schedule_mixed_lines() {
        let value = Normalize::Schedule.apply("Mon 08:00-10:00 น.(ท)\nTBD");
        assert_eq!(
            value,
            json!([
                {"day": "Mon", "time": "08:00-10:00", "type": "ท"},
                {"raw": "TBD"}
            ])
        );
    }

    #[test]
    fn test_first_match_in_document_order_wins() {
        static RULE: ExtractionRule = ExtractionRule {
            name: "label",
            selector: ".label",
            attribute: None,
            normalize: Normalize::Text,
            required: false,
            default: FieldDefault::EmptyText,
        };
        let document = Html::parse_document(
            "<div class=\"card\"><span class=\"label\">first</span><span class=\"label\">second</span></div>",
        );
        let selector = Selector::parse(".card").unwrap();
        let container = first_container(&document, &selector);
        let compiled = CompiledRule::compile(&RULE).unwrap();
        assert_eq!(extract_field(container, &compiled), Some(json!("first")));
    }

    #[test]
    fn test_selector_scoped_to_container() {
        static RULE: ExtractionRule = ExtractionRule {
            name: "name",
            selector: ".name",
            attribute: None,
            normalize: Normalize::Text,
            required: true,
            default: FieldDefault::EmptyText,
        };
        // The .name outside the card must not leak into the card's record.
        let document = Html::parse_document(
            "<p class=\"name\">global</p><div class=\"card\"><span class=\"other\">x</span></div>",
        );
        let selector = Selector::parse(".card").unwrap();
        let container = first_container(&document, &selector);
        let compiled = CompiledRule::compile(&RULE).unwrap();
        assert_eq!(extract_field(container, &compiled), None);
    }

    #[test]
    fn test_attribute_extraction() {
        static RULE: ExtractionRule = ExtractionRule {
            name: "link",
            selector: "a.course-link",
            attribute: Some("href"),
            normalize: Normalize::Text,
            required: false,
            default: FieldDefault::Null,
        };
        let document = Html::parse_document(
            "<div class=\"card\"><a class=\"course-link\" href=\"/c/NDk2\">open</a></div>",
        );
        let selector = Selector::parse(".card").unwrap();
        let container = first_container(&document, &selector);
        let compiled = CompiledRule::compile(&RULE).unwrap();
        assert_eq!(extract_field(container, &compiled), Some(json!("/c/NDk2")));
    }

    #[test]
    fn test_missing_attribute_counts_as_miss() {
        static RULE: ExtractionRule = ExtractionRule {
            name: "link",
            selector: "a",
            attribute: Some("href"),
            normalize: Normalize::Text,
            required: false,
            default: FieldDefault::Null,
        };
        let document = Html::parse_document("<div class=\"card\"><a>no href</a></div>");
        let selector = Selector::parse(".card").unwrap();
        let container = first_container(&document, &selector);
        let compiled = CompiledRule::compile(&RULE).unwrap();
        assert_eq!(extract_field(container, &compiled), None);
    }

    #[test]
    fn test_field_default_values() {
        assert_eq!(FieldDefault::EmptyText.value(), json!(""));
        assert_eq!(FieldDefault::Null.value(), Value::Null);
        assert_eq!(FieldDefault::EmptyList.value(), json!([]));
    }
}
