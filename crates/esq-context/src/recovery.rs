//! Brace-balancing recovery for partial documents.

use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug)]
struct ScanInfo {
    stack: Vec<Container>,
    in_string: bool,
    /// Byte offset of the opening quote of the unterminated string, when
    /// `in_string` is set.
    string_open: usize,
}

/// Try to turn a partially typed document into parseable JSON.
///
/// A strict parse is attempted first. Otherwise the text is cut back to the
/// longest prefix that is structurally consistent outside string literals
/// (dangling keys, separators and half-typed literals at the cut point are
/// dropped), and the closers for still-open containers are appended. Text
/// with more closers than openers at any point cannot be balanced and is
/// treated as opaque: recovery returns `None` rather than guessing.
pub fn recover_parse(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    let balanced = balance(text)?;
    match serde_json::from_str(&balanced) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(%err, "recovery parse failed after balancing");
            None
        }
    }
}

fn structural_scan(text: &str) -> Option<ScanInfo> {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escape = false;
    let mut string_open = 0;
    for (i, ch) in text.char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                string_open = i;
            }
            '{' => stack.push(Container::Object),
            '[' => stack.push(Container::Array),
            '}' => {
                if stack.pop() != Some(Container::Object) {
                    return None;
                }
            }
            ']' => {
                if stack.pop() != Some(Container::Array) {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(ScanInfo {
        stack,
        in_string,
        string_open,
    })
}

/// Byte offset of the opening quote of the string literal that ends exactly
/// at the end of `text`.
fn last_string_start(text: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escape = false;
    let mut start = None;
    let mut last_completed = None;
    for (i, ch) in text.char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
                if i + 1 == text.len() {
                    last_completed = start;
                }
            }
            continue;
        }
        if ch == '"' {
            in_string = true;
            start = Some(i);
        }
    }
    last_completed
}

fn is_primitive_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '+')
}

fn balance(text: &str) -> Option<String> {
    let info = structural_scan(text)?;
    // An unterminated string is dropped wholesale; the loop below then
    // removes whatever separator introduced it.
    let mut end = if info.in_string {
        info.string_open
    } else {
        text.len()
    };

    loop {
        end = text[..end].trim_end().len();
        if end == 0 {
            return None;
        }
        let prefix = &text[..end];
        let last = prefix.chars().next_back()?;
        match last {
            ':' => {
                // Drop the separator and the key it belongs to.
                end -= 1;
                end = text[..end].trim_end().len();
                if text[..end].ends_with('"') {
                    end = last_string_start(&text[..end])?;
                }
            }
            ',' => end -= 1,
            '"' => {
                let start = last_string_start(prefix)?;
                let inner = structural_scan(&text[..start])?;
                let before = text[..start].trim_end();
                let in_object = matches!(inner.stack.last(), Some(Container::Object));
                // In an object, a string introduced by `{` or `,` is a key
                // with no value yet; anywhere else it is a complete value.
                if in_object && matches!(before.chars().next_back(), Some('{') | Some(',')) {
                    end = start;
                } else {
                    break;
                }
            }
            '{' | '[' | '}' | ']' => break,
            _ => {
                // Trailing bare word; keep it only if it already is a
                // complete JSON literal (number, true, false, null).
                let token_start = prefix
                    .rfind(|c: char| !is_primitive_char(c))
                    .map(|p| p + 1)
                    .unwrap_or(0);
                let token = &prefix[token_start..];
                if serde_json::from_str::<Value>(token).is_ok() {
                    break;
                }
                end = token_start;
            }
        }
    }

    let final_info = structural_scan(&text[..end])?;
    let mut out = text[..end].trim_end().to_string();
    for container in final_info.stack.iter().rev() {
        out.push(match container {
            Container::Object => '}',
            Container::Array => ']',
        });
    }
    Some(out)
}
