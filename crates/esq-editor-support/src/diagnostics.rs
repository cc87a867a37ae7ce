//! Conversion of findings to editor diagnostics.

use lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};

use crate::findings::{Finding, Severity, Span};

/// Source tag carried by every diagnostic, so re-validation replaces
/// exactly the markers this engine owns.
pub const DIAGNOSTIC_SOURCE: &str = "esq";

/// Convert a validation pass into the replace-all payload for the editor's
/// marker sink.
pub fn findings_to_diagnostics(text: &str, findings: &[Finding]) -> Vec<Diagnostic> {
    findings
        .iter()
        .map(|finding| finding_to_diagnostic(text, finding))
        .collect()
}

fn finding_to_diagnostic(text: &str, finding: &Finding) -> Diagnostic {
    let range = match &finding.span {
        Some(span) => span_to_range(span),
        None => locate_path(text, &finding.path),
    };
    let severity = match finding.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Info => DiagnosticSeverity::INFORMATION,
    };
    Diagnostic {
        range,
        severity: Some(severity),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: finding.message.clone(),
        ..Default::default()
    }
}

fn span_to_range(span: &Span) -> Range {
    Range {
        start: Position {
            line: span.start_line,
            character: span.start_col,
        },
        end: Position {
            line: span.end_line,
            character: span.end_col,
        },
    }
}

/// Best-effort range for a finding that carries only a path: the first
/// occurrence of its innermost named key in the source text.
fn locate_path(text: &str, path: &[String]) -> Range {
    let named = path
        .iter()
        .rev()
        .find(|segment| !segment.chars().all(|ch| ch.is_ascii_digit()));
    let Some(key) = named else {
        return Range::default();
    };
    let needle = format!("\"{key}\"");
    match text.find(&needle) {
        Some(offset) => Range {
            start: offset_to_position(text, offset + 1),
            end: offset_to_position(text, offset + 1 + key.len()),
        },
        None => Range::default(),
    }
}

/// Line/column of a byte offset, recovered by scanning newlines. Columns
/// are UTF-16 code units, matching editor position semantics.
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let offset = offset.min(text.len());
    let mut line = 0u32;
    let mut character = 0u32;
    for ch in text[..offset].chars() {
        if ch == '\n' {
            line += 1;
            character = 0;
        } else {
            character += ch.len_utf16() as u32;
        }
    }
    Position { line, character }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_map_to_lines_and_columns() {
        let text = "line1\nline2 with error\nline3";
        let position = offset_to_position(text, 12);
        assert_eq!(position.line, 1);
        assert_eq!(position.character, 6);
    }

    #[test]
    fn finding_without_span_locates_its_key() {
        let text = "{\n  \"query\": {\n    \"shoulda\": []\n  }\n}";
        let finding = Finding::error(
            vec!["query".to_string(), "shoulda".to_string()],
            "unknown bool clause 'shoulda'",
        );
        let diagnostic = finding_to_diagnostic(text, &finding);
        assert_eq!(diagnostic.range.start.line, 2);
        assert_eq!(diagnostic.range.start.character, 5);
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(diagnostic.source.as_deref(), Some(DIAGNOSTIC_SOURCE));
    }

    #[test]
    fn numeric_path_tail_falls_back_to_named_segment() {
        let text = "{\"bool\": {\"must\": []}}";
        let finding = Finding::warning(
            vec!["bool".to_string(), "must".to_string(), "0".to_string()],
            "test",
        );
        let diagnostic = finding_to_diagnostic(text, &finding);
        // Locates "must", not the array index.
        assert_eq!(diagnostic.range.start.character, 11);
    }
}
