//! Grammar tables for the query DSL.
//!
//! These are public so host UIs can render pick-lists from the same tables
//! the completion and validation engines use.

pub use esq_context::QUERY_CLAUSE_TYPES;

/// Characters the host should register as completion triggers.
pub const TRIGGER_CHARACTERS: &[&str] = &["\"", ":", "{", "[", ",", " "];

/// Keys allowed at the top level of a search body.
pub const TOP_LEVEL_KEYS: &[&str] = &[
    "query",
    "aggs",
    "aggregations",
    "sort",
    "size",
    "from",
    "timeout",
    "track_total_hits",
    "track_scores",
    "min_score",
    "source",
    "_source",
    "fields",
    "script_fields",
    "explain",
    "profile",
    "highlight",
    "rescore",
    "search_after",
    "collapse",
];

/// Clause keys allowed directly inside a `bool` query.
pub const BOOL_CLAUSES: &[&str] = &["must", "should", "filter", "must_not"];

/// Clause types that take a field→query map like `match` does.
pub const MATCH_FAMILY: &[&str] = &[
    "match",
    "match_phrase",
    "match_phrase_prefix",
    "multi_match",
];

/// Options accepted inside a match-family field configuration object.
pub const MATCH_OPTIONS: &[&str] = &[
    "query",
    "operator",
    "analyzer",
    "boost",
    "fuzziness",
    "minimum_should_match",
    "zero_terms_query",
    "lenient",
    "prefix_length",
    "max_expansions",
    "slop",
];

/// Comparison operators of a `range` clause.
pub const RANGE_OPERATORS: &[&str] = &["gt", "gte", "lt", "lte"];

/// Every key accepted inside a `range` field configuration object.
pub const RANGE_PARAMS: &[&str] = &["gt", "gte", "lt", "lte", "format", "time_zone"];

/// Known aggregation types.
pub const AGGREGATION_TYPES: &[&str] = &[
    "terms",
    "date_histogram",
    "histogram",
    "avg",
    "sum",
    "min",
    "max",
    "stats",
    "extended_stats",
    "cardinality",
    "percentiles",
    "percentile_ranks",
    "value_count",
    "range",
    "date_range",
    "ip_range",
    "filter",
    "filters",
    "missing",
    "nested",
    "reverse_nested",
    "global",
    "sampler",
    "diversified_sampler",
    "significant_terms",
    "top_hits",
    "composite",
    "geo_distance",
];

/// Aggregation types that do not operate on a single `field`.
pub const AGGS_WITHOUT_FIELD: &[&str] = &["filter", "filters", "diversified_sampler"];

/// Relative date expressions suggested for date-typed values.
pub const RELATIVE_DATE_TOKENS: &[&str] = &[
    "now",
    "now-1h",
    "now-1d",
    "now-7d",
    "now-30d",
    "now-1y",
    "now/d",
];

/// Example CIDR literals suggested for `ip` fields.
pub const IP_EXAMPLES: &[&str] = &["192.168.0.0/16", "10.0.0.0/8"];

pub const SORT_ORDERS: &[&str] = &["asc", "desc"];

pub fn is_query_clause(name: &str) -> bool {
    QUERY_CLAUSE_TYPES.contains(&name)
}

pub fn is_aggregation_type(name: &str) -> bool {
    AGGREGATION_TYPES.contains(&name)
}

pub fn is_match_family(name: &str) -> bool {
    MATCH_FAMILY.contains(&name)
}

/// A concrete example literal for a declared date `format`, used to seed
/// value suggestions on date fields.
pub fn date_format_example(format: &str) -> Option<&'static str> {
    // Mappings may declare several formats joined by `||`; the first known
    // one wins.
    for single in format.split("||") {
        let example = match single.trim() {
            "yyyy-MM-dd" | "date" => Some("2024-01-01"),
            "yyyy-MM-dd HH:mm:ss" => Some("2024-01-01 12:00:00"),
            "strict_date_optional_time" | "date_optional_time" => Some("2024-01-01T12:00:00Z"),
            "basic_date" => Some("20240101"),
            "epoch_millis" => Some("1700000000000"),
            "epoch_second" => Some("1700000000"),
            _ => None,
        };
        if example.is_some() {
            return example;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_and_aggregation_tables_overlap_where_expected() {
        // `terms`, `range` and `nested` are both query clauses and
        // aggregation types; the tables must agree on spelling.
        for shared in ["terms", "range", "nested", "filter"] {
            assert!(is_aggregation_type(shared) || BOOL_CLAUSES.contains(&shared));
        }
        assert!(is_query_clause("match_phrase_prefix"));
        assert!(!is_query_clause("match_phrase_suffix"));
    }

    #[test]
    fn date_format_examples_cover_compound_formats() {
        assert_eq!(date_format_example("yyyy-MM-dd"), Some("2024-01-01"));
        assert_eq!(
            date_format_example("unknown_format||epoch_millis"),
            Some("1700000000000")
        );
        assert_eq!(date_format_example("totally_custom"), None);
    }
}
