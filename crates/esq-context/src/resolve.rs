//! Context resolution at a cursor offset.

use tracing::debug;

use crate::record::{ContextRecord, Expecting, Location, PathSegment};
use crate::recovery::recover_parse;
use crate::scanner::ScanState;

/// Query clause types the resolver and the completion/validation layers
/// recognize. A path segment matching one of these names marks the nearest
/// enclosing clause.
pub const QUERY_CLAUSE_TYPES: &[&str] = &[
    "match",
    "match_all",
    "match_none",
    "match_phrase",
    "match_phrase_prefix",
    "multi_match",
    "term",
    "terms",
    "terms_set",
    "range",
    "exists",
    "prefix",
    "wildcard",
    "regexp",
    "fuzzy",
    "ids",
    "bool",
    "boosting",
    "constant_score",
    "dis_max",
    "function_score",
    "nested",
    "has_child",
    "has_parent",
    "query_string",
    "simple_query_string",
    "geo_distance",
    "geo_bounding_box",
    "more_like_this",
    "script",
    "script_score",
    "rank_feature",
    "distance_feature",
    "intervals",
    "percolate",
    "wrapper",
];

const BOOL_CLAUSE_NAMES: &[&str] = &["must", "should", "filter", "must_not"];

/// Resolve the structural context at `offset` within `text`.
///
/// Works on the prefix up to the cursor only, so the rest of the buffer may
/// be arbitrarily broken. Never fails: an offset past the end clamps, and a
/// prefix the scanner cannot place degrades to [`ContextRecord::unknown`].
pub fn resolve_context(text: &str, offset: usize) -> ContextRecord {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let prefix = &text[..offset];

    let mut state = ScanState::default();
    for ch in prefix.chars() {
        state.advance(ch);
    }

    if state.stack.is_empty() {
        // Cursor is outside every container: either an empty/complete
        // document (root) or text recovery cannot make sense of (unknown).
        if prefix.trim().is_empty() || recover_parse(text).is_some() {
            return ContextRecord {
                location: Location::Root,
                expecting: expectation(prefix),
                ..Default::default()
            };
        }
        debug!("unbalanceable document prefix, degrading to unknown context");
        return ContextRecord::unknown();
    }

    let path = state.path();
    let (location, query_type, bool_clause) = classify(&path);
    ContextRecord {
        depth: path.len(),
        current_key: state.current_key().map(str::to_string),
        parent_key: state.parent_key().map(str::to_string),
        expecting: expectation(prefix),
        location,
        query_type,
        bool_clause,
        path,
    }
}

fn classify(path: &[PathSegment]) -> (Location, Option<String>, Option<String>) {
    let mut location = Location::Root;
    let mut query_type = None;
    let mut bool_clause = None;
    for segment in path {
        let Some(key) = segment.as_key() else { continue };
        match key {
            "query" => location = Location::Query,
            "aggs" | "aggregations" => location = Location::Aggs,
            "bool" => location = Location::Bool,
            name if BOOL_CLAUSE_NAMES.contains(&name) => {
                location = Location::BoolClause;
                bool_clause = Some(name.to_string());
            }
            name if QUERY_CLAUSE_TYPES.contains(&name) => {
                query_type = Some(name.to_string());
            }
            _ => {}
        }
    }
    (location, query_type, bool_clause)
}

/// Key-vs-value expectation from the text on the cursor's line.
///
/// The last colon on the line anchors the decision. A colon whose value
/// slot opens a new container (`{` or `[`) puts the cursor back in a key
/// position; an odd number of quotes after it means the cursor is inside
/// an open string value; only whitespace means the value has not started;
/// anything else is a value being typed. A line without a colon is a key
/// position.
fn expectation(prefix: &str) -> Expecting {
    let line = prefix.rsplit('\n').next().unwrap_or("");
    let Some(colon) = line.rfind(':') else {
        return Expecting::Key;
    };
    let after = &line[colon + 1..];
    let trimmed = after.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Expecting::Key;
    }

    let mut quotes = 0usize;
    let mut escape = false;
    for ch in after.chars() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '"' => quotes += 1,
            _ => {}
        }
    }
    if quotes % 2 == 1 {
        return Expecting::Value;
    }
    if trimmed.is_empty() {
        return Expecting::Key;
    }
    Expecting::Value
}
