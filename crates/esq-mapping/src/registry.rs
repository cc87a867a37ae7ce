//! Flattened field registry with ancestor-prefix lookup.

use ahash::AHashMap;

use crate::field::FieldInfo;

/// Flat map of dot-joined field paths to their metadata.
///
/// Built fresh per mapping fetch and immutable once published; consumers
/// (completion, validation, hover) only read it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRegistry {
    fields: AHashMap<String, FieldInfo>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, path: String, info: FieldInfo) {
        self.fields.insert(path, info);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Exact lookup, no prefix fallback.
    pub fn get(&self, path: &str) -> Option<&FieldInfo> {
        self.fields.get(path)
    }

    /// Look up a field, falling back to the longest stored ancestor path.
    ///
    /// `a.b.c` resolves to the entry for `a.b` when only `a.b` is mapped,
    /// which is what makes `.keyword`-style sub-field references usable even
    /// when the sub-field itself was not walked. Returns the path that
    /// actually matched alongside the metadata.
    pub fn resolve(&self, name: &str) -> Option<(&str, &FieldInfo)> {
        if let Some((path, info)) = self.fields.get_key_value(name) {
            return Some((path.as_str(), info));
        }
        let mut candidate = name;
        while let Some(dot) = candidate.rfind('.') {
            candidate = &candidate[..dot];
            if let Some((path, info)) = self.fields.get_key_value(candidate) {
                return Some((path.as_str(), info));
            }
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// All field paths in sorted order, for deterministic suggestion lists.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldInfo)> {
        self.fields.iter().map(|(path, info)| (path.as_str(), info))
    }

    /// Markdown summary for the editor's hover callback.
    pub fn hover_info(&self, word: &str) -> Option<String> {
        let (path, info) = self.resolve(word)?;
        let mut text = format!("`{path}` — {}", info.field_type);
        if info.is_multi_field
            && let Some(parent) = &info.parent_field
        {
            text.push_str(&format!("\n\nmulti-field of `{parent}`"));
        }
        if let Some(analyzer) = &info.analyzer {
            text.push_str(&format!("\n\nanalyzer: `{analyzer}`"));
        }
        if let Some(search_analyzer) = &info.search_analyzer {
            text.push_str(&format!("\n\nsearch analyzer: `{search_analyzer}`"));
        }
        if let Some(normalizer) = &info.normalizer {
            text.push_str(&format!("\n\nnormalizer: `{normalizer}`"));
        }
        if let Some(format) = &info.format {
            text.push_str(&format!("\n\nformat: `{format}`"));
        }
        if !info.multi_field_names.is_empty() {
            let subs: Vec<String> = info
                .multi_field_names
                .iter()
                .map(|name| format!("`{path}.{name}`"))
                .collect();
            text.push_str(&format!("\n\nsub-fields: {}", subs.join(", ")));
        }
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    fn registry_with(paths: &[(&str, FieldType)]) -> FieldRegistry {
        let mut registry = FieldRegistry::new();
        for (path, field_type) in paths {
            registry.insert(
                path.to_string(),
                FieldInfo {
                    field_type: field_type.clone(),
                    ..Default::default()
                },
            );
        }
        registry
    }

    #[test]
    fn resolve_prefers_exact_match() {
        let registry = registry_with(&[("a", FieldType::Object), ("a.b", FieldType::Text)]);
        let (path, info) = registry.resolve("a.b").unwrap();
        assert_eq!(path, "a.b");
        assert_eq!(info.field_type, FieldType::Text);
    }

    #[test]
    fn resolve_falls_back_to_longest_ancestor() {
        let registry = registry_with(&[("a.b", FieldType::Text)]);
        let (path, _) = registry.resolve("a.b.c").unwrap();
        assert_eq!(path, "a.b");
        assert!(registry.resolve("x").is_none());
        assert!(registry.resolve("a").is_none());
    }

    #[test]
    fn hover_mentions_type_and_analyzer() {
        let mut registry = FieldRegistry::new();
        registry.insert(
            "title".to_string(),
            FieldInfo {
                field_type: FieldType::Text,
                analyzer: Some("standard".to_string()),
                multi_field_names: vec!["keyword".to_string()],
                ..Default::default()
            },
        );
        let hover = registry.hover_info("title").unwrap();
        assert!(hover.contains("text"));
        assert!(hover.contains("standard"));
        assert!(hover.contains("`title.keyword`"));
        assert!(registry.hover_info("missing").is_none());
    }
}
