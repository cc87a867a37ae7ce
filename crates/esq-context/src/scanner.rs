//! Character-at-a-time scan state machine.
//!
//! The machine only needs the text prefix up to the cursor to be internally
//! consistent, so it never rejects input: unexpected characters leave the
//! state unchanged rather than erroring.

use crate::record::PathSegment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub container: Container,
    /// Key in the parent object under which this container was opened.
    pub key: Option<String>,
    /// Completed `"key":` in this object whose value has not finished yet.
    pub pending_key: Option<String>,
}

/// Scan state advanced one input character at a time.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScanState {
    pub in_string: bool,
    escape_pending: bool,
    literal: String,
    /// Completed string literal not yet claimed by a `:`.
    closed_string: Option<String>,
    pub stack: Vec<Frame>,
}

impl ScanState {
    pub fn advance(&mut self, ch: char) {
        if self.in_string {
            if self.escape_pending {
                self.escape_pending = false;
                self.literal.push(ch);
            } else if ch == '\\' {
                self.escape_pending = true;
            } else if ch == '"' {
                self.in_string = false;
                self.closed_string = Some(std::mem::take(&mut self.literal));
            } else {
                self.literal.push(ch);
            }
            return;
        }

        match ch {
            '"' => {
                self.closed_string = None;
                self.in_string = true;
                self.literal.clear();
            }
            ':' => {
                if let Some(key) = self.closed_string.take()
                    && let Some(frame) = self.stack.last_mut()
                    && frame.container == Container::Object
                {
                    frame.pending_key = Some(key);
                }
            }
            '{' => {
                let key = self.take_pending_key();
                self.closed_string = None;
                self.stack.push(Frame {
                    container: Container::Object,
                    key,
                    pending_key: None,
                });
            }
            '[' => {
                let key = self.take_pending_key();
                self.closed_string = None;
                self.stack.push(Frame {
                    container: Container::Array,
                    key,
                    pending_key: None,
                });
            }
            '}' | ']' => {
                self.stack.pop();
                self.closed_string = None;
            }
            ',' => {
                if let Some(frame) = self.stack.last_mut() {
                    frame.pending_key = None;
                }
                self.closed_string = None;
            }
            c if c.is_whitespace() => {}
            _ => {
                // Primitive value character; a preceding completed string
                // was a value, not a key.
                self.closed_string = None;
            }
        }
    }

    fn take_pending_key(&mut self) -> Option<String> {
        self.stack.last_mut().and_then(|frame| frame.pending_key.take())
    }

    /// Segments from the root to the innermost open container.
    pub fn path(&self) -> Vec<PathSegment> {
        let mut segments = Vec::new();
        for (i, frame) in self.stack.iter().enumerate() {
            if let Some(key) = &frame.key {
                segments.push(PathSegment::Key(key.clone()));
            } else if i > 0 {
                segments.push(PathSegment::ArrayEntry);
            }
        }
        segments
    }

    /// Key immediately governing the cursor's container.
    pub fn current_key(&self) -> Option<&str> {
        let innermost = self.stack.last()?;
        innermost.pending_key.as_deref().or(innermost.key.as_deref())
    }

    pub fn parent_key(&self) -> Option<&str> {
        let innermost = self.stack.last()?;
        if innermost.pending_key.is_some() {
            return innermost.key.as_deref();
        }
        self.stack
            .iter()
            .rev()
            .skip(1)
            .find_map(|frame| frame.key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> ScanState {
        let mut state = ScanState::default();
        for ch in text.chars() {
            state.advance(ch);
        }
        state
    }

    fn keys(state: &ScanState) -> Vec<String> {
        state
            .path()
            .iter()
            .map(|segment| match segment {
                PathSegment::Key(key) => key.clone(),
                PathSegment::ArrayEntry => "[]".to_string(),
            })
            .collect()
    }

    #[test]
    fn tracks_nested_object_keys() {
        let state = scan(r#"{"query":{"match":{"#);
        assert_eq!(keys(&state), ["query", "match"]);
        assert_eq!(state.current_key(), Some("match"));
        assert_eq!(state.parent_key(), Some("query"));
    }

    #[test]
    fn pending_key_becomes_current_key() {
        let state = scan(r#"{"query":{"match":{"user.name":"#);
        assert_eq!(keys(&state), ["query", "match"]);
        assert_eq!(state.current_key(), Some("user.name"));
        assert_eq!(state.parent_key(), Some("match"));
    }

    #[test]
    fn open_string_value_keeps_pending_key() {
        let state = scan(r#"{"query":{"match":{"user.name":"par"#);
        assert!(state.in_string);
        assert_eq!(state.current_key(), Some("user.name"));
    }

    #[test]
    fn array_entries_are_marked_distinctly() {
        let state = scan(r#"{"query":{"bool":{"must":[{"#);
        assert_eq!(keys(&state), ["query", "bool", "must", "[]"]);
    }

    #[test]
    fn closers_pop_path_segments() {
        let state = scan(r#"{"query":{"term":{"a":1}},"#);
        assert_eq!(keys(&state), Vec::<String>::new());
        assert_eq!(state.stack.len(), 1);
        // comma cleared the pending binding of the root object
        assert_eq!(state.current_key(), None);
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let state = scan(r#"{"a":"say \"hi"#);
        assert!(state.in_string);
        assert_eq!(state.current_key(), Some("a"));
    }

    #[test]
    fn commas_clear_consumed_bindings() {
        let state = scan(r#"{"size":10,"#);
        assert_eq!(state.current_key(), None);
        let state = scan(r#"{"size":10"#);
        assert_eq!(state.current_key(), Some("size"));
    }

    #[test]
    fn stray_closers_never_panic() {
        let state = scan(r#"}]}"#);
        assert!(state.stack.is_empty());
        assert!(state.path().is_empty());
    }
}
