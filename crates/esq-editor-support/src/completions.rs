//! Completion engine.

use std::collections::HashSet;

use esq_context::{ContextRecord, Expecting, Location, PathSegment, resolve_context};
use esq_mapping::{FieldRegistry, FieldType};
use lsp_types::{CompletionItem, CompletionItemKind};

use crate::grammar;
use crate::templates;
use crate::token::current_token;

/// Documents whose text before the cursor is shorter than this still get the
/// full-document templates offered, since a nearly empty buffer is most
/// likely about to be scaffolded from scratch.
const TEMPLATE_TEXT_THRESHOLD: usize = 40;

/// Compute completion suggestions at `offset`.
///
/// Synchronous and deterministic: the registry has already been fetched and
/// is only read. The in-progress token never affects the resolved path and
/// is used as the case-insensitive prefix filter on the candidates.
pub fn complete(text: &str, offset: usize, registry: &FieldRegistry) -> Vec<CompletionItem> {
    let token = current_token(text, offset);
    // The scanner never completes a half-typed key or value, so resolving
    // at the raw cursor already sees the prefix without the token.
    let record = resolve_context(text, offset);

    let mut items = match record.expecting {
        Expecting::Key => key_suggestions(&record, registry),
        Expecting::Value => value_suggestions(&record, registry),
    };

    if text[..token.start].trim().len() < TEMPLATE_TEXT_THRESHOLD {
        items.extend(templates::template_completions());
    }

    filter_and_dedupe(items, &token.text)
}

fn key_suggestions(record: &ContextRecord, registry: &FieldRegistry) -> Vec<CompletionItem> {
    if record.path.is_empty() {
        return items(grammar::TOP_LEVEL_KEYS, CompletionItemKind::PROPERTY);
    }
    // Dispatch on the innermost named segment; array entries in between do
    // not change what kind of key is expected.
    let last_key = record.path.iter().rev().find_map(PathSegment::as_key);
    match last_key {
        Some("query") => clause_items(),
        Some("bool") => items(grammar::BOOL_CLAUSES, CompletionItemKind::KEYWORD),
        Some(key) if grammar::BOOL_CLAUSES.contains(&key) => clause_items(),
        Some("aggs") | Some("aggregations") => items(grammar::AGGREGATION_TYPES, CompletionItemKind::KEYWORD),
        Some(key) if grammar::is_query_clause(key) => field_items(registry),
        Some(_) if record.location == Location::Aggs => {
            items(grammar::AGGREGATION_TYPES, CompletionItemKind::KEYWORD)
        }
        _ => Vec::new(),
    }
}

fn value_suggestions(record: &ContextRecord, registry: &FieldRegistry) -> Vec<CompletionItem> {
    let Some(current_key) = record.current_key.as_deref() else {
        return Vec::new();
    };
    let query_type = record.query_type.as_deref();

    if current_key == "operator" && query_type.is_some_and(grammar::is_match_family) {
        return items(&["and", "or"], CompletionItemKind::VALUE);
    }
    if query_type == Some("range") && grammar::RANGE_OPERATORS.contains(&current_key) {
        // The comparison value is typed by the field that owns the operator
        // object, one container out.
        return record
            .parent_key
            .as_deref()
            .and_then(|parent| registry.resolve(parent))
            .map(|(_, info)| field_value_items(info))
            .unwrap_or_default();
    }

    let Some((_, info)) = registry.resolve(current_key) else {
        return Vec::new();
    };
    if info.field_type.is_numeric() && query_type == Some("range") {
        // Typing directly against a numeric field inside a range clause:
        // the next token is one of the comparison operators.
        return items(grammar::RANGE_OPERATORS, CompletionItemKind::PROPERTY);
    }
    field_value_items(info)
}

fn field_value_items(info: &esq_mapping::FieldInfo) -> Vec<CompletionItem> {
    match &info.field_type {
        FieldType::Boolean => items(&["true", "false"], CompletionItemKind::VALUE),
        FieldType::Date => {
            let mut suggestions = items(grammar::RELATIVE_DATE_TOKENS, CompletionItemKind::VALUE);
            if let Some(format) = &info.format
                && let Some(example) = grammar::date_format_example(format)
            {
                suggestions.push(item(example, CompletionItemKind::VALUE));
            }
            suggestions
        }
        FieldType::Ip => items(grammar::IP_EXAMPLES, CompletionItemKind::VALUE),
        FieldType::GeoPoint => {
            vec![item(
                r#"{ "lat": 40.7, "lon": -74.0 }"#,
                CompletionItemKind::VALUE,
            )]
        }
        _ => Vec::new(),
    }
}

fn clause_items() -> Vec<CompletionItem> {
    items(grammar::QUERY_CLAUSE_TYPES, CompletionItemKind::KEYWORD)
}

fn field_items(registry: &FieldRegistry) -> Vec<CompletionItem> {
    registry
        .field_names()
        .into_iter()
        .map(|name| {
            let detail = registry
                .get(name)
                .map(|info| info.field_type.to_string());
            CompletionItem {
                label: name.to_string(),
                kind: Some(CompletionItemKind::FIELD),
                detail,
                ..Default::default()
            }
        })
        .collect()
}

fn items(labels: &[&str], kind: CompletionItemKind) -> Vec<CompletionItem> {
    labels.iter().map(|label| item(label, kind)).collect()
}

fn item(label: &str, kind: CompletionItemKind) -> CompletionItem {
    CompletionItem {
        label: label.to_string(),
        kind: Some(kind),
        ..Default::default()
    }
}

fn filter_and_dedupe(candidates: Vec<CompletionItem>, prefix: &str) -> Vec<CompletionItem> {
    let prefix = prefix.to_lowercase();
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| candidate.label.to_lowercase().starts_with(&prefix))
        .filter(|candidate| seen.insert(candidate.label.clone()))
        .collect()
}
