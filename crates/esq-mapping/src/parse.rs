//! `_mapping` response parsing.

use serde_json::{Map, Value};
use tracing::warn;

use crate::field::{FieldInfo, FieldType};
use crate::registry::FieldRegistry;

/// Build a registry from a `_mapping` response keyed by index name.
///
/// Each index entry contributes its `mappings.properties` tree; entries are
/// merged into one flat registry with later entries winning on path
/// collision, since indices matched by one wildcard pattern are expected to
/// share a mapping. A malformed entry is skipped with a log line, and a
/// null or non-object response yields an empty registry.
pub fn build_registry(response: &Value) -> FieldRegistry {
    let mut registry = FieldRegistry::new();
    let Some(indices) = response.as_object() else {
        return registry;
    };
    for (index_name, entry) in indices {
        let properties = entry
            .get("mappings")
            .and_then(|mappings| mappings.get("properties"))
            .and_then(Value::as_object);
        match properties {
            Some(properties) => walk_properties(properties, "", &mut registry),
            None => {
                warn!(index = %index_name, "mapping entry has no properties, skipping");
            }
        }
    }
    registry
}

fn walk_properties(properties: &Map<String, Value>, prefix: &str, registry: &mut FieldRegistry) {
    for (name, field) in properties {
        let path = join_path(prefix, name);
        let Some(field_obj) = field.as_object() else {
            warn!(field = %path, "malformed field entry, skipping");
            continue;
        };

        let sub_properties = field_obj.get("properties").and_then(Value::as_object);
        let field_type = field_obj
            .get("type")
            .and_then(Value::as_str)
            .map(FieldType::parse)
            .unwrap_or(FieldType::Object);

        let mut info = FieldInfo {
            is_nested: field_type == FieldType::Nested,
            field_type,
            analyzer: string_prop(field_obj, "analyzer"),
            search_analyzer: string_prop(field_obj, "search_analyzer"),
            normalizer: string_prop(field_obj, "normalizer"),
            format: string_prop(field_obj, "format"),
            has_sub_properties: sub_properties.is_some(),
            ..Default::default()
        };

        if let Some(multi_fields) = field_obj.get("fields").and_then(Value::as_object) {
            for (sub_name, sub_field) in multi_fields {
                info.multi_field_names.push(sub_name.clone());
                registry.insert(join_path(&path, sub_name), multi_field_info(sub_field, &path));
            }
        }

        registry.insert(path.clone(), info);

        if let Some(sub_properties) = sub_properties {
            walk_properties(sub_properties, &path, registry);
        }
    }
}

fn multi_field_info(sub_field: &Value, parent: &str) -> FieldInfo {
    let sub_obj = sub_field.as_object();
    let field_type = sub_obj
        .and_then(|obj| obj.get("type"))
        .and_then(Value::as_str)
        .map(FieldType::parse)
        .unwrap_or(FieldType::Keyword);
    FieldInfo {
        field_type,
        analyzer: sub_obj.and_then(|obj| string_prop(obj, "analyzer")),
        normalizer: sub_obj.and_then(|obj| string_prop(obj, "normalizer")),
        format: sub_obj.and_then(|obj| string_prop(obj, "format")),
        is_multi_field: true,
        parent_field: Some(parent.to_string()),
        ..Default::default()
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn string_prop(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_nested_properties() {
        let response = json!({
            "logs-1": {
                "mappings": {
                    "properties": {
                        "user": {
                            "properties": {
                                "name": { "type": "text", "analyzer": "standard" },
                                "age": { "type": "integer" }
                            }
                        },
                        "created": { "type": "date", "format": "yyyy-MM-dd" }
                    }
                }
            }
        });
        let registry = build_registry(&response);

        assert_eq!(registry.get("user").unwrap().field_type, FieldType::Object);
        assert!(registry.get("user").unwrap().has_sub_properties);
        assert_eq!(
            registry.get("user.name").unwrap().analyzer.as_deref(),
            Some("standard")
        );
        assert_eq!(
            registry.get("user.age").unwrap().field_type,
            FieldType::Integer
        );
        assert_eq!(
            registry.get("created").unwrap().format.as_deref(),
            Some("yyyy-MM-dd")
        );
    }

    #[test]
    fn emits_synthetic_multi_field_entries() {
        let response = json!({
            "idx": {
                "mappings": {
                    "properties": {
                        "title": {
                            "type": "text",
                            "fields": {
                                "keyword": { "type": "keyword" },
                                "raw": { "type": "keyword" }
                            }
                        }
                    }
                }
            }
        });
        let registry = build_registry(&response);

        let title = registry.get("title").unwrap();
        assert_eq!(
            title.multi_field_names,
            vec!["keyword".to_string(), "raw".to_string()]
        );
        let keyword = registry.get("title.keyword").unwrap();
        assert!(keyword.is_multi_field);
        assert_eq!(keyword.parent_field.as_deref(), Some("title"));
        assert_eq!(keyword.field_type, FieldType::Keyword);
    }

    #[test]
    fn nested_type_sets_is_nested() {
        let response = json!({
            "idx": {
                "mappings": {
                    "properties": {
                        "comments": {
                            "type": "nested",
                            "properties": {
                                "author": { "type": "keyword" }
                            }
                        }
                    }
                }
            }
        });
        let registry = build_registry(&response);
        assert!(registry.get("comments").unwrap().is_nested);
        assert!(!registry.get("comments.author").unwrap().is_nested);
    }

    #[test]
    fn merges_indices_with_later_entries_winning() {
        let response = json!({
            "a-index": {
                "mappings": { "properties": { "shared": { "type": "text" } } }
            },
            "b-index": {
                "mappings": { "properties": { "shared": { "type": "keyword" } } }
            }
        });
        let registry = build_registry(&response);
        // Response object order is preserved, so b-index walks last and wins.
        assert_eq!(
            registry.get("shared").unwrap().field_type,
            FieldType::Keyword
        );
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let response = json!({
            "broken": { "mappings": "not-an-object" },
            "fine": {
                "mappings": { "properties": { "ok": { "type": "boolean" } } }
            }
        });
        let registry = build_registry(&response);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("ok").is_some());
    }

    #[test]
    fn non_object_input_yields_empty_registry() {
        assert!(build_registry(&Value::Null).is_empty());
        assert!(build_registry(&json!([1, 2])).is_empty());
    }
}
