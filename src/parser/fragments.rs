//! Last-resort recovery of individual objects from damaged output.
//!
//! Generated lists are often cut off mid-item or contain one malformed element. Scanning
//! for balanced `{...}` chunks and keeping the ones that parse salvages the rest.

use serde_json::{Map, Value};

use super::repair::fix_commas_and_strings;
use super::scan::object_spans;

/// Deepest nesting a fragment may have. Each byte then takes part in at most this many
/// parse attempts.
const MAX_FRAGMENT_DEPTH: usize = 32;

/// Every parseable object fragment in `text` that carries all `required` fields.
///
/// With no required fields any non-empty object qualifies. A qualifying fragment is
/// consumed whole; otherwise its nested objects are tried in turn.
pub(crate) fn collect(text: &str, required: &[String]) -> Vec<Value> {
    let mut found = Vec::new();
    let mut consumed = 0;

    for (start, end) in object_spans(text.as_bytes(), MAX_FRAGMENT_DEPTH) {
        if start < consumed {
            continue;
        }

        if let Some(object) = parse_fragment(&text[start..=end]) {
            if qualifies(&object, required) {
                found.push(Value::Object(object));
                consumed = end + 1;
            }
        }
    }

    found
}

fn parse_fragment(chunk: &str) -> Option<Map<String, Value>> {
    let parsed = serde_json::from_str::<Value>(chunk)
        .or_else(|_| serde_json::from_str::<Value>(&fix_commas_and_strings(chunk)))
        .ok()?;

    match parsed {
        Value::Object(object) => Some(object),
        _ => None,
    }
}

fn qualifies(object: &Map<String, Value>, required: &[String]) -> bool {
    if required.is_empty() {
        return !object.is_empty();
    }
    required.iter().all(|field| object.contains_key(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{Duration, Instant};

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_truncated_list_keeps_complete_items() {
        let text = r#"[{"front": "a", "back": "1"}, {"front": "b", "back": "2"}, {"front": "c", "ba"#;
        let found = collect(text, &fields(&["front", "back"]));
        assert_eq!(
            found,
            vec![
                json!({"front": "a", "back": "1"}),
                json!({"front": "b", "back": "2"})
            ]
        );
    }

    #[test]
    fn test_malformed_fragment_skipped() {
        let text = r#"{"q": "one"} {"q": oops} {"q": "three",}"#;
        let found = collect(text, &fields(&["q"]));
        assert_eq!(found, vec![json!({"q": "one"}), json!({"q": "three"})]);
    }

    #[test]
    fn test_nested_items_found_inside_broken_wrapper() {
        let text = r#"{"questions": [{"q": "x", "a": "1"}, {"q": "y", "a": "2"}], "extra": }"#;
        let found = collect(text, &fields(&["q", "a"]));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_fragments_missing_required_fields_ignored() {
        let text = r#"{"front": "a"} {"front": "b", "back": "2"}"#;
        let found = collect(text, &fields(&["front", "back"]));
        assert_eq!(found, vec![json!({"front": "b", "back": "2"})]);
    }

    #[test]
    fn test_unbalanced_braces_scan_in_linear_time() {
        let text = "{".repeat(1 << 20);
        let started = Instant::now();
        assert!(collect(&text, &[]).is_empty());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_deeply_nested_braces_stay_bounded() {
        let block = format!("{}{}", "{".repeat(200), "}".repeat(200));
        let text = block.repeat(1_000);
        let started = Instant::now();
        assert!(collect(&text, &[]).is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_empty_objects_do_not_qualify_without_required_fields() {
        assert!(collect("{} {}", &[]).is_empty());
    }
}
