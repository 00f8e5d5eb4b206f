//! Recovering a [`SummaryResult`] from raw model output.
//!
//! Models wrap JSON in code fences or chatter around it despite being told
//! not to. [`parse`] strips a surrounding fence and takes the span from the
//! first `{` to the last `}`; [`validate`] then enforces the field windows.
//!
//! The greedy span is a heuristic: output holding two separate objects (or
//! unbalanced braces in surrounding prose) yields an undecodable span, which
//! ends up as the fallback result rather than a mis-parse.

use crate::error::PayloadError;
use crate::models::SummaryResult;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

/// Accepted summary length, in characters.
pub const SUMMARY_CHARS: RangeInclusive<usize> = 40..=500;

/// Accepted number of tags.
pub const TAG_COUNT: RangeInclusive<usize> = 3..=8;

static LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\A```(?:json)?\s*").expect("static regex is valid"));
static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*```\z").expect("static regex is valid"));

/// The JSON object located in a model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPayload(pub Map<String, Value>);

/// Locate and decode the JSON object embedded in `raw`.
///
/// # Errors
///
/// - [`PayloadError::NoPayloadFound`] when there is no `{ … }` span
/// - [`PayloadError::Decode`] when the span is not valid JSON
pub fn parse(raw: &str) -> Result<ParsedPayload, PayloadError> {
    let trimmed = raw.trim();
    let unfenced = LEADING_FENCE.replace(trimmed, "");
    let unfenced = TRAILING_FENCE.replace(&unfenced, "");

    let start = unfenced.find('{').ok_or(PayloadError::NoPayloadFound)?;
    let end = unfenced.rfind('}').ok_or(PayloadError::NoPayloadFound)?;
    if end < start {
        return Err(PayloadError::NoPayloadFound);
    }

    match serde_json::from_str::<Value>(&unfenced[start..=end])? {
        Value::Object(map) => Ok(ParsedPayload(map)),
        _ => Err(PayloadError::NoPayloadFound),
    }
}

/// Enforce the summary/tags schema on a parsed payload.
///
/// On success the fields are returned verbatim.
///
/// # Errors
///
/// [`PayloadError::SchemaViolation`] when `summary` is missing, not a string,
/// or outside [`SUMMARY_CHARS`]; or when `tags` is missing, not an array of
/// strings, or outside [`TAG_COUNT`].
pub fn validate(payload: ParsedPayload) -> Result<SummaryResult, PayloadError> {
    let ParsedPayload(mut map) = payload;

    let summary = match map.remove("summary") {
        Some(Value::String(s)) => s,
        Some(other) => return Err(violation(format!("summary must be a string, got {}", kind(&other)))),
        None => return Err(violation("summary is missing")),
    };
    let len = summary.chars().count();
    if !SUMMARY_CHARS.contains(&len) {
        return Err(violation(format!(
            "summary has {len} characters, expected {}..={}",
            SUMMARY_CHARS.start(),
            SUMMARY_CHARS.end()
        )));
    }

    let tags = match map.remove("tags") {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(violation(format!("tags must be strings, got {}", kind(&other)))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => return Err(violation(format!("tags must be an array, got {}", kind(&other)))),
        None => return Err(violation("tags is missing")),
    };
    if !TAG_COUNT.contains(&tags.len()) {
        return Err(violation(format!(
            "{} tags, expected {}..={}",
            tags.len(),
            TAG_COUNT.start(),
            TAG_COUNT.end()
        )));
    }

    Ok(SummaryResult { summary, tags })
}

/// Parse and validate in one step.
pub fn parse_summary(raw: &str) -> Result<SummaryResult, PayloadError> {
    parse(raw).and_then(validate)
}

fn violation(msg: impl Into<String>) -> PayloadError {
    PayloadError::SchemaViolation(msg.into())
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> ParsedPayload {
        match v {
            Value::Object(map) => ParsedPayload(map),
            _ => panic!("test payload must be an object"),
        }
    }

    fn tags(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("topic {i}")).collect()
    }

    #[test]
    fn test_fenced_and_bare_parse_identically() {
        let fenced = parse("```json\n{\"summary\":\"x\",\"tags\":[\"a\"]}\n```").unwrap();
        let bare = parse("{\"summary\":\"x\",\"tags\":[\"a\"]}").unwrap();
        assert_eq!(fenced, bare);
    }

    #[test]
    fn test_fence_is_case_insensitive_and_optional_tag() {
        let upper = parse("```JSON\n{\"a\":1}\n```").unwrap();
        let untagged = parse("```\n{\"a\":1}\n```").unwrap();
        assert_eq!(upper, untagged);
    }

    #[test]
    fn test_stray_text_around_object() {
        let p = parse("Sure! Here it is:\n{\"summary\":\"x\",\"tags\":[]}\nHope that helps.").unwrap();
        assert_eq!(p.0.get("summary"), Some(&json!("x")));
    }

    #[test]
    fn test_nested_object_is_kept_whole() {
        let p = parse("{\"outer\":{\"inner\":true}}").unwrap();
        assert_eq!(p.0.get("outer"), Some(&json!({"inner": true})));
    }

    #[test]
    fn test_no_braces() {
        assert!(matches!(parse("I cannot help with that."), Err(PayloadError::NoPayloadFound)));
        assert!(matches!(parse(""), Err(PayloadError::NoPayloadFound)));
        assert!(matches!(parse("} backwards {"), Err(PayloadError::NoPayloadFound)));
    }

    #[test]
    fn test_two_objects_fail_to_decode() {
        let raw = "{\"summary\":\"a\"} and also {\"summary\":\"b\"}";
        assert!(matches!(parse(raw), Err(PayloadError::Decode(_))));
    }

    #[test]
    fn test_truncated_json_fails_to_decode() {
        assert!(matches!(parse("{\"summary\": \"cut off\", \"tags\": [}"), Err(PayloadError::Decode(_))));
    }

    #[test]
    fn test_validator_lower_bounds() {
        let ok = validate(payload(json!({"summary": "s".repeat(40), "tags": tags(3)})));
        assert!(ok.is_ok());

        let short = validate(payload(json!({"summary": "s".repeat(39), "tags": tags(3)})));
        assert!(matches!(short, Err(PayloadError::SchemaViolation(_))));

        let few = validate(payload(json!({"summary": "s".repeat(40), "tags": tags(2)})));
        assert!(matches!(few, Err(PayloadError::SchemaViolation(_))));
    }

    #[test]
    fn test_validator_upper_bounds() {
        assert!(validate(payload(json!({"summary": "s".repeat(500), "tags": tags(8)}))).is_ok());

        let long = validate(payload(json!({"summary": "s".repeat(501), "tags": tags(3)})));
        assert!(matches!(long, Err(PayloadError::SchemaViolation(_))));

        let many = validate(payload(json!({"summary": "s".repeat(100), "tags": tags(9)})));
        assert!(matches!(many, Err(PayloadError::SchemaViolation(_))));
    }

    #[test]
    fn test_validator_counts_characters_not_bytes() {
        // 40 CJK characters are 120 bytes
        let r = validate(payload(json!({"summary": "摘".repeat(40), "tags": tags(3)})));
        assert!(r.is_ok());
    }

    #[test]
    fn test_validator_type_errors() {
        let cases = [
            json!({"tags": tags(3)}),
            json!({"summary": 42, "tags": tags(3)}),
            json!({"summary": "s".repeat(50)}),
            json!({"summary": "s".repeat(50), "tags": "a, b, c"}),
            json!({"summary": "s".repeat(50), "tags": ["a", "b", 3]}),
        ];
        for case in cases {
            assert!(
                matches!(validate(payload(case.clone())), Err(PayloadError::SchemaViolation(_))),
                "expected violation for {case}"
            );
        }
    }

    #[test]
    fn test_validator_returns_fields_verbatim() {
        let summary = "  Leading spaces and a trailing one are preserved as given by the model. ";
        let r = validate(payload(json!({
            "summary": summary,
            "tags": ["Rust", "Web Scraping", "LLM"],
            "extra": "ignored"
        })))
        .unwrap();
        assert_eq!(r.summary, summary);
        assert_eq!(r.tags, vec!["Rust", "Web Scraping", "LLM"]);
    }

    #[test]
    fn test_parse_summary_end_to_end() {
        let raw = format!(
            "```json\n{{\"summary\":\"{}\",\"tags\":[\"a\",\"b\",\"c\"]}}\n```",
            "x".repeat(150)
        );
        let r = parse_summary(&raw).unwrap();
        assert_eq!(r.summary.len(), 150);
        assert_eq!(r.tags.len(), 3);
    }
}
