//! Schema-validating diagnostics engine.

use serde_json::{Map, Value};

use esq_mapping::FieldRegistry;

use crate::findings::{Finding, Span};
use crate::grammar;

/// Validate a complete document against the clause grammar and the field
/// registry.
///
/// A document that does not parse yields exactly one error finding at the
/// reported position and nothing else. On a successful parse every check
/// runs independently and appends to one shared list; no check short-
/// circuits another.
pub fn validate(text: &str, registry: &FieldRegistry) -> Vec<Finding> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => return vec![syntax_finding(&err)],
    };
    let Some(root) = value.as_object() else {
        return vec![Finding::error(
            Vec::new(),
            "search body must be a JSON object",
        )];
    };

    let mut findings = Vec::new();
    check_top_level_keys(root, &mut findings);
    if let Some(query) = root.get("query") {
        validate_query(query, &[s("query")], registry, &mut findings);
    }
    for aggs_key in ["aggs", "aggregations"] {
        if let Some(aggs) = root.get(aggs_key) {
            validate_aggs(aggs, &[s(aggs_key)], registry, &mut findings);
        }
    }
    if let Some(sort) = root.get("sort") {
        validate_sort(sort, &[s("sort")], registry, &mut findings);
    }
    validate_pagination(root, &mut findings);
    findings
}

fn syntax_finding(err: &serde_json::Error) -> Finding {
    let line = (err.line() as u32).saturating_sub(1);
    let col = (err.column() as u32).saturating_sub(1);
    Finding::error(Vec::new(), format!("document is not valid JSON: {err}")).with_span(Span {
        start_line: line,
        start_col: col,
        end_line: line,
        end_col: col + 1,
    })
}

fn check_top_level_keys(root: &Map<String, Value>, findings: &mut Vec<Finding>) {
    for key in root.keys() {
        if !grammar::TOP_LEVEL_KEYS.contains(&key.as_str()) {
            findings.push(Finding::warning(
                vec![key.clone()],
                format!("unknown top-level key '{key}'"),
            ));
        }
    }
}

fn validate_query(
    value: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    let Some(clauses) = value.as_object() else {
        findings.push(Finding::error(path.to_vec(), "query must be an object"));
        return;
    };
    for (name, body) in clauses {
        let clause_path = join(path, name);
        match name.as_str() {
            "bool" => validate_bool(body, &clause_path, registry, findings),
            "match" | "match_phrase" | "match_phrase_prefix" => {
                validate_match(name, body, &clause_path, registry, findings);
            }
            "term" | "terms" => validate_term(name, body, &clause_path, registry, findings),
            "range" => validate_range(body, &clause_path, registry, findings),
            "exists" => validate_exists(body, &clause_path, registry, findings),
            "multi_match" => validate_multi_match(body, &clause_path, registry, findings),
            "nested" => validate_nested(body, &clause_path, registry, findings),
            _ if grammar::is_query_clause(name) => {
                if !body.is_object() {
                    findings.push(Finding::error(
                        clause_path,
                        format!("{name} clause must be an object"),
                    ));
                }
            }
            _ => findings.push(Finding::error(
                clause_path,
                format!("unknown query clause '{name}'"),
            )),
        }
    }
}

fn validate_bool(
    body: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    let Some(clauses) = body.as_object() else {
        findings.push(Finding::error(path.to_vec(), "bool clause must be an object"));
        return;
    };
    for (clause, sub) in clauses {
        let clause_path = join(path, clause);
        if !grammar::BOOL_CLAUSES.contains(&clause.as_str()) {
            findings.push(Finding::error(
                clause_path,
                format!("unknown bool clause '{clause}'"),
            ));
            continue;
        }
        match sub {
            Value::Array(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    validate_query(entry, &join(&clause_path, &i.to_string()), registry, findings);
                }
            }
            // The backend also accepts a single clause object here.
            Value::Object(_) => validate_query(sub, &clause_path, registry, findings),
            _ => findings.push(Finding::error(
                clause_path,
                format!("bool clause '{clause}' must be an array of clauses"),
            )),
        }
    }
}

fn validate_match(
    name: &str,
    body: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    let Some(fields) = body.as_object() else {
        findings.push(Finding::error(
            path.to_vec(),
            format!("{name} clause must be an object"),
        ));
        return;
    };
    for (field, config) in fields {
        let field_path = join(path, field);
        check_field_known(field, &field_path, registry, findings);
        if let Some(options) = config.as_object() {
            for option in options.keys() {
                if !grammar::MATCH_OPTIONS.contains(&option.as_str()) {
                    findings.push(Finding::warning(
                        join(&field_path, option),
                        format!("unknown {name} option '{option}'"),
                    ));
                }
            }
            if let Some(operator) = options.get("operator")
                && !matches!(operator.as_str(), Some("and") | Some("or"))
            {
                findings.push(Finding::error(
                    join(&field_path, "operator"),
                    "operator must be \"and\" or \"or\"",
                ));
            }
        }
    }
}

fn validate_term(
    name: &str,
    body: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    let Some(fields) = body.as_object() else {
        findings.push(Finding::error(
            path.to_vec(),
            format!("{name} clause must be an object"),
        ));
        return;
    };
    for (field, value) in fields {
        let field_path = join(path, field);
        check_field_known(field, &field_path, registry, findings);
        if value.is_object() {
            findings.push(Finding::error(
                field_path,
                format!("{name} value for '{field}' must not be an object"),
            ));
        }
    }
}

fn validate_range(
    body: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    let Some(fields) = body.as_object() else {
        findings.push(Finding::error(path.to_vec(), "range clause must be an object"));
        return;
    };
    if fields.len() != 1 {
        findings.push(Finding::error(
            path.to_vec(),
            "range clause requires exactly one field",
        ));
    }
    for (field, config) in fields {
        let field_path = join(path, field);
        check_field_known(field, &field_path, registry, findings);
        if let Some((_, info)) = registry.resolve(field)
            && !info.field_type.is_rangeable()
        {
            findings.push(Finding::warning(
                field_path.clone(),
                format!(
                    "field '{field}' of type {} is not a range-capable type",
                    info.field_type
                ),
            ));
        }
        let Some(params) = config.as_object() else {
            findings.push(Finding::error(
                field_path,
                "range field must be an object of comparison operators",
            ));
            continue;
        };
        let mut operators = 0;
        for param in params.keys() {
            if grammar::RANGE_OPERATORS.contains(&param.as_str()) {
                operators += 1;
            } else if !grammar::RANGE_PARAMS.contains(&param.as_str()) {
                findings.push(Finding::error(
                    join(&field_path, param),
                    format!("unknown range operator '{param}'"),
                ));
            }
        }
        if operators == 0 {
            findings.push(Finding::error(
                field_path,
                "range requires at least one of gt, gte, lt, lte",
            ));
        }
    }
}

fn validate_exists(
    body: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    let Some(obj) = body.as_object() else {
        findings.push(Finding::error(path.to_vec(), "exists clause must be an object"));
        return;
    };
    match obj.get("field").and_then(Value::as_str) {
        Some(field) => check_field_known(field, &join(path, "field"), registry, findings),
        None => findings.push(Finding::error(
            path.to_vec(),
            "exists requires a string 'field' property",
        )),
    }
}

fn validate_multi_match(
    body: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    let Some(obj) = body.as_object() else {
        findings.push(Finding::error(
            path.to_vec(),
            "multi_match clause must be an object",
        ));
        return;
    };
    if obj.get("query").is_none() {
        findings.push(Finding::error(
            path.to_vec(),
            "multi_match requires a 'query' property",
        ));
    }
    match obj.get("fields") {
        None => findings.push(Finding::error(
            path.to_vec(),
            "multi_match requires a 'fields' property",
        )),
        Some(Value::Array(entries)) => {
            let fields_path = join(path, "fields");
            for entry in entries {
                match entry.as_str() {
                    Some(name) => {
                        // A `^boost` suffix is not part of the field name.
                        let bare = name.split('^').next().unwrap_or(name);
                        check_field_known(bare, &fields_path, registry, findings);
                    }
                    None => findings.push(Finding::error(
                        fields_path.clone(),
                        "multi_match fields entries must be strings",
                    )),
                }
            }
        }
        Some(_) => findings.push(Finding::error(
            join(path, "fields"),
            "multi_match 'fields' must be an array",
        )),
    }
}

fn validate_nested(
    body: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    let Some(obj) = body.as_object() else {
        findings.push(Finding::error(path.to_vec(), "nested clause must be an object"));
        return;
    };
    match obj.get("path").and_then(Value::as_str) {
        Some(nested_path) => {
            if let Some((_, info)) = registry.resolve(nested_path) {
                if !info.is_nested {
                    findings.push(Finding::error(
                        join(path, "path"),
                        format!("field '{nested_path}' is not mapped as nested"),
                    ));
                }
            } else {
                check_field_known(nested_path, &join(path, "path"), registry, findings);
            }
        }
        None => findings.push(Finding::error(
            path.to_vec(),
            "nested requires a string 'path' property",
        )),
    }
    match obj.get("query") {
        Some(query) => validate_query(query, &join(path, "query"), registry, findings),
        None => findings.push(Finding::error(
            path.to_vec(),
            "nested requires a 'query' property",
        )),
    }
}

fn validate_aggs(
    value: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    let Some(aggs) = value.as_object() else {
        findings.push(Finding::error(path.to_vec(), "aggs must be an object"));
        return;
    };
    for (agg_name, config) in aggs {
        let agg_path = join(path, agg_name);
        let Some(config_obj) = config.as_object() else {
            findings.push(Finding::error(agg_path, "aggregation must be an object"));
            continue;
        };
        for (key, body) in config_obj {
            if key == "aggs" || key == "aggregations" {
                validate_aggs(body, &join(&agg_path, key), registry, findings);
                continue;
            }
            let type_path = join(&agg_path, key);
            if !grammar::is_aggregation_type(key) {
                findings.push(Finding::error(
                    type_path,
                    format!("unknown aggregation type '{key}'"),
                ));
                continue;
            }
            validate_agg_body(key, body, &type_path, registry, findings);
        }
    }
}

fn validate_agg_body(
    agg_type: &str,
    body: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    let Some(obj) = body.as_object() else {
        findings.push(Finding::error(
            path.to_vec(),
            format!("{agg_type} aggregation body must be an object"),
        ));
        return;
    };
    match obj.get("field").and_then(Value::as_str) {
        Some(field) => check_field_known(field, &join(path, "field"), registry, findings),
        None if !grammar::AGGS_WITHOUT_FIELD.contains(&agg_type) => {
            findings.push(Finding::warning(
                path.to_vec(),
                format!("{agg_type} aggregation has no 'field' property"),
            ));
        }
        None => {}
    }
    if agg_type == "date_histogram"
        && !obj.contains_key("calendar_interval")
        && !obj.contains_key("fixed_interval")
    {
        findings.push(Finding::warning(
            path.to_vec(),
            "date_histogram should declare calendar_interval or fixed_interval",
        ));
    }
    if agg_type == "histogram" && !obj.contains_key("interval") {
        findings.push(Finding::warning(
            path.to_vec(),
            "histogram should declare an interval",
        ));
    }
    // A filter aggregation's body is itself a query clause.
    if agg_type == "filter" {
        validate_query(body, path, registry, findings);
    }
}

fn validate_sort(
    value: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    match value {
        Value::Array(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                validate_sort_entry(entry, &join(path, &i.to_string()), registry, findings);
            }
        }
        other => validate_sort_entry(other, path, registry, findings),
    }
}

fn validate_sort_entry(
    entry: &Value,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    match entry {
        Value::String(field) => check_sort_field(field, path, registry, findings),
        Value::Object(fields) => {
            for (field, config) in fields {
                let field_path = join(path, field);
                check_sort_field(field, &field_path, registry, findings);
                let order = match config {
                    Value::String(order) => Some(order.as_str()),
                    Value::Object(options) => options.get("order").and_then(Value::as_str),
                    _ => None,
                };
                if let Some(order) = order
                    && !grammar::SORT_ORDERS.contains(&order)
                {
                    findings.push(Finding::error(
                        field_path,
                        "sort order must be \"asc\" or \"desc\"",
                    ));
                }
            }
        }
        _ => findings.push(Finding::error(
            path.to_vec(),
            "sort entry must be a field name or an object",
        )),
    }
}

fn check_sort_field(
    field: &str,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    if field == "_score" || field == "_doc" {
        return;
    }
    check_field_known(field, path, registry, findings);
}

fn validate_pagination(root: &Map<String, Value>, findings: &mut Vec<Finding>) {
    let size = integer_value(root.get("size"), "size", findings);
    let from = integer_value(root.get("from"), "from", findings);
    if let Some(size) = size {
        if size > 10_000 {
            findings.push(Finding::info(
                vec![s("size")],
                "size above 10000; consider search_after or scroll instead",
            ));
        } else if let Some(from) = from
            && from + size > 10_000
        {
            findings.push(Finding::info(
                vec![s("from")],
                "from + size above 10000; prefer cursor-based pagination with search_after",
            ));
        }
    }
}

fn integer_value(
    value: Option<&Value>,
    key: &str,
    findings: &mut Vec<Finding>,
) -> Option<u64> {
    let value = value?;
    match value.as_u64() {
        Some(n) => Some(n),
        None => {
            findings.push(Finding::warning(
                vec![s(key)],
                format!("{key} must be a non-negative integer"),
            ));
            None
        }
    }
}

/// Unknown-field checks are suppressed entirely when no schema is loaded,
/// so an empty registry degrades to grammar-only validation instead of
/// flagging every field.
fn check_field_known(
    field: &str,
    path: &[String],
    registry: &FieldRegistry,
    findings: &mut Vec<Finding>,
) {
    if registry.is_empty() {
        return;
    }
    if registry.resolve(field).is_none() {
        findings.push(Finding::warning(
            path.to_vec(),
            format!("unknown field '{field}'"),
        ));
    }
}

fn join(path: &[String], segment: &str) -> Vec<String> {
    let mut next = path.to_vec();
    next.push(segment.to_string());
    next
}

fn s(segment: &str) -> String {
    segment.to_string()
}
