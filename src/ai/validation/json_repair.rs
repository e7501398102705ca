//! JSON Repair Mechanism
//!
//! Text-level helpers for model output that is not valid JSON as written:
//! - Markdown code fence wrapping (```json ... ```) and BOM
//! - JSON embedded in explanatory text
//! - Truncated output: unterminated strings, missing closers
//! - Trailing commas
//!
//! The structural repair is a single left-to-right scan with three states
//! (`Normal`, `InString`, `AfterEscape`) and an explicit stack of expected
//! closers. It never consults a JSON parser while scanning, so its output is a
//! pure function of the input text.

use tracing::trace;

// =============================================================================
// Preprocessing
// =============================================================================

/// Trim, drop a UTF-8 BOM and strip a surrounding markdown code fence
pub fn preprocess(raw: &str) -> String {
    let s = raw.trim().trim_start_matches('\u{feff}').trim();
    strip_code_fences(s).trim().to_string()
}

fn strip_code_fences(s: &str) -> &str {
    let mut result = s;

    // Remove ```json ... ``` or ``` ... ```
    if result.starts_with("```") {
        result = match result.find('\n') {
            Some(first_newline) => &result[first_newline + 1..],
            None => result.trim_start_matches('`'),
        };
    }

    if let Some(stripped) = result.trim_end().strip_suffix("```") {
        result = stripped;
    }

    result
}

// =============================================================================
// Substring extraction
// =============================================================================

/// Slice from the first `{` to the last `}`, if that span exists
pub fn object_substring(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

// =============================================================================
// Structural repair
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InString,
    AfterEscape,
}

/// Close whatever a truncated payload left open
///
/// Starts at the first `{` or `[`; returns `None` when there is neither.
/// Mismatched closers are dropped, raw control characters inside strings are
/// escaped, and scanning stops once the outermost container closes.
pub fn repair_structure(text: &str) -> Option<String> {
    let start = text.find(['{', '['])?;
    let body = &text[start..];

    let mut out = String::with_capacity(body.len() + 16);
    let mut stack: Vec<char> = Vec::new();
    let mut state = ScanState::Normal;

    for ch in body.chars() {
        match state {
            ScanState::Normal => match ch {
                '"' => {
                    state = ScanState::InString;
                    out.push(ch);
                }
                '{' => {
                    stack.push('}');
                    out.push(ch);
                }
                '[' => {
                    stack.push(']');
                    out.push(ch);
                }
                '}' | ']' => {
                    if stack.last() == Some(&ch) {
                        stack.pop();
                        out.push(ch);
                        if stack.is_empty() {
                            break;
                        }
                    } else {
                        trace!(closer = %ch, "dropping mismatched closer");
                    }
                }
                _ => out.push(ch),
            },
            ScanState::InString => match ch {
                '\\' => {
                    state = ScanState::AfterEscape;
                    out.push(ch);
                }
                '"' => {
                    state = ScanState::Normal;
                    out.push(ch);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() && (c as u32) < 0x20 => {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => out.push(c),
            },
            ScanState::AfterEscape => {
                state = ScanState::InString;
                out.push(ch);
            }
        }
    }

    match state {
        ScanState::AfterEscape => {
            out.pop();
            out.push('"');
        }
        ScanState::InString => out.push('"'),
        ScanState::Normal => {}
    }

    // A key cut off right after its colon still needs a value
    if !stack.is_empty() && out.trim_end().ends_with(':') {
        out.push_str("null");
    }

    while let Some(closer) = stack.pop() {
        out.push(closer);
    }

    Some(fix_trailing_commas(&out))
}

/// Remove commas (outside strings) that directly precede `]` or `}`
pub fn fix_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];

        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            result.push(ch);
            i += 1;
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            // Look ahead, skipping whitespace
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }

            if j < chars.len() && (chars[j] == ']' || chars[j] == '}') {
                i += 1;
                continue;
            }
        }

        result.push(ch);
        i += 1;
    }

    result
}
