//! Bracket scanning that understands JSON strings.
//!
//! All delimiters are ASCII, so scanning bytes is safe on UTF-8 input: continuation
//! bytes never collide with `{`, `[`, `"` or `\`.

/// Index of the bracket closing the one at `start`, or `None` if it never closes.
///
/// Brackets inside string literals are ignored. Both bracket kinds count towards depth,
/// but the final closing byte must match the opening one.
pub(crate) fn matching_close(bytes: &[u8], start: usize) -> Option<usize> {
    let close = match bytes.get(start)? {
        b'{' => b'}',
        b'[' => b']',
        _ => return None,
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (b == close).then_some(start + offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// Start and end of every balanced `{...}` in `bytes` nested at most `max_depth` deep,
/// ordered by start.
///
/// One pass with an explicit stack. Quotes only open strings inside brackets, so a stray
/// quote in surrounding prose does not hide the objects after it. A pair whose closing
/// byte does not match its opening one is dropped, as in [`matching_close`].
pub(crate) fn object_spans(bytes: &[u8], max_depth: usize) -> Vec<(usize, usize)> {
    struct Open {
        byte: u8,
        start: usize,
        depth: usize,
    }

    let mut stack: Vec<Open> = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' if !stack.is_empty() => in_string = true,
            b'{' | b'[' => stack.push(Open {
                byte: b,
                start: i,
                depth: 1,
            }),
            b'}' | b']' => {
                let Some(open) = stack.pop() else {
                    continue;
                };
                if let Some(parent) = stack.last_mut() {
                    parent.depth = parent.depth.max(open.depth + 1);
                }
                if open.byte == b'{' && b == b'}' && open.depth <= max_depth {
                    spans.push((open.start, i));
                }
            }
            _ => {}
        }
    }

    spans.sort_unstable_by_key(|&(start, _)| start);
    spans
}

/// The first balanced `open ... close` substring of `text`.
pub(crate) fn first_balanced(text: &str, open: u8) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == open)?;
    let end = matching_close(bytes, start)?;
    Some(&text[start..=end])
}

/// Contents of the first fenced code block, without the fence or its language tag.
///
/// An unterminated fence runs to the end of the text.
pub(crate) fn strip_code_fences(text: &str) -> Option<&str> {
    const FENCE: &str = "```";

    let start = text.find(FENCE)?;
    let after = &text[start + FENCE.len()..];

    let body = match after.find('\n') {
        Some(newline) if is_language_tag(&after[..newline]) => &after[newline + 1..],
        _ => after,
    };

    let end = body.find(FENCE).unwrap_or(body.len());
    Some(body[..end].trim())
}

fn is_language_tag(candidate: &str) -> bool {
    candidate
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+')
}
