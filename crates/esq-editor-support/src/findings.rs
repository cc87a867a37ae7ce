//! Validation findings

use serde::Serialize;

/// Severity of a finding.
///
/// The taxonomy is fixed: grammar violations are errors, schema mismatches
/// are warnings (the mapping may be stale), advisory notices are info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Line/column span of a finding, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

/// One positioned validation finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    /// Key path from the document root to the offending node.
    pub path: Vec<String>,
    pub span: Option<Span>,
}

impl Finding {
    pub fn error(path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            path,
            span: None,
        }
    }

    pub fn warning(path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            path,
            span: None,
        }
    }

    pub fn info(path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            path,
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}
