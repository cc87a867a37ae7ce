//! In-progress token extraction.

/// The token being typed at the cursor and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CurrentToken {
    pub text: String,
    pub start: usize,
}

/// Extract the run of word characters, or the content of an unterminated
/// quoted string, ending at the cursor.
///
/// The returned `start` is where the context resolver should look instead
/// of the raw cursor: the prefix before the token is internally consistent
/// even while the token itself is half-typed.
pub(crate) fn current_token(text: &str, offset: usize) -> CurrentToken {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let line_start = text[..offset].rfind('\n').map(|pos| pos + 1).unwrap_or(0);
    let line = &text[line_start..offset];

    if let Some(quote) = open_quote(line) {
        let start = line_start + quote + 1;
        return CurrentToken {
            text: text[start..offset].to_string(),
            start,
        };
    }

    let bytes = text.as_bytes();
    let mut start = offset;
    while start > line_start && is_word_byte(bytes[start - 1]) {
        start -= 1;
    }
    CurrentToken {
        text: text[start..offset].to_string(),
        start,
    }
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.'
}

/// Byte offset within `line` of the opening quote of an unterminated
/// string literal, if the line ends inside one.
fn open_quote(line: &str) -> Option<usize> {
    let mut open = None;
    let mut in_string = false;
    let mut escape = false;
    for (i, ch) in line.char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
                open = None;
            }
        } else if ch == '"' {
            in_string = true;
            open = Some(i);
        }
    }
    open
}
