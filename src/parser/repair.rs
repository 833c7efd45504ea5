//! Conservative textual repairs applied before the cascade is retried.

use super::ExpectedShape;

/// Apply every repair: drop prose around the outermost brackets, strip control
/// characters, escape raw line breaks inside strings and drop trailing commas.
pub(crate) fn repair(text: &str, shape: ExpectedShape) -> String {
    let cleaned = strip_control_chars(text);
    let bounded = trim_to_brackets(&cleaned, shape);
    fix_commas_and_strings(bounded)
}

/// Remove control characters other than line breaks and tabs.
pub(crate) fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Slice from the first opening bracket of `shape` to the last closing one.
pub(crate) fn trim_to_brackets(text: &str, shape: ExpectedShape) -> &str {
    let (open, close) = shape.delimiters();
    match (text.find(open as char), text.rfind(close as char)) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Drop commas directly before `}` or `]` and escape raw line breaks inside strings.
pub(crate) fn fix_commas_and_strings(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_commas_removed() {
        assert_eq!(
            fix_commas_and_strings(r#"[{"q":"x",},{"q":"y"},]"#),
            r#"[{"q":"x"},{"q":"y"}]"#
        );
    }

    #[test]
    fn test_commas_inside_strings_untouched() {
        let text = r#"{"a": "x,]"}"#;
        assert_eq!(fix_commas_and_strings(text), text);
    }

    #[test]
    fn test_raw_newlines_in_strings_escaped() {
        let repaired = fix_commas_and_strings("{\"a\": \"line one\nline two\"}");
        assert_eq!(repaired, "{\"a\": \"line one\\nline two\"}");
        assert!(serde_json::from_str::<serde_json::Value>(&repaired).is_ok());
    }

    #[test]
    fn test_control_characters_stripped() {
        assert_eq!(strip_control_chars("{\u{0}\"a\":\u{7} 1}\n"), "{\"a\": 1}\n");
    }

    #[test]
    fn test_prose_trimmed_to_brackets() {
        let text = "The cards are: [1, 2, 3]. Enjoy!";
        assert_eq!(trim_to_brackets(text, ExpectedShape::Array), "[1, 2, 3]");
        assert_eq!(trim_to_brackets(text, ExpectedShape::Object), text);
    }

    #[test]
    fn test_full_repair() {
        let text = "Output:\n{\"a\": [1, 2,],\u{1b}}\nDone";
        let repaired = repair(text, ExpectedShape::Object);
        assert_eq!(repaired, "{\"a\": [1, 2]}");
    }
}
