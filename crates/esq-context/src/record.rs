//! Structural context records

/// One step of the path from the document root to a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key under which the container was opened.
    Key(String),
    /// An element of an array.
    ArrayEntry,
}

impl PathSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key.as_str()),
            Self::ArrayEntry => None,
        }
    }
}

/// Broad structural region the cursor sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Location {
    #[default]
    Unknown,
    Root,
    Query,
    Bool,
    BoolClause,
    Aggs,
}

/// Whether the next thing typed at the cursor is a key or a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expecting {
    #[default]
    Key,
    Value,
}

/// Structural context of a cursor position.
///
/// Constructed fresh per resolution call and never persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextRecord {
    /// Segments from the root to the innermost container enclosing the
    /// cursor.
    pub path: Vec<PathSegment>,
    pub location: Location,
    /// Name of the nearest enclosing query-clause type, if any.
    pub query_type: Option<String>,
    /// Name of the enclosing bool clause (`must`, `should`, ...), if any.
    pub bool_clause: Option<String>,
    /// Key immediately governing the cursor's container.
    pub current_key: Option<String>,
    pub parent_key: Option<String>,
    pub expecting: Expecting,
    pub depth: usize,
}

impl ContextRecord {
    /// The degraded record returned when the text is opaque to the resolver.
    pub fn unknown() -> Self {
        Self::default()
    }
}
