//! Boilerplate query templates.
//!
//! Offered whenever the document is still short enough that the author is
//! most likely scaffolding from scratch, and exposed for host-side
//! "insert example" menus.

use lsp_types::{CompletionItem, CompletionItemKind, Documentation};

pub struct QueryTemplate {
    pub label: &'static str,
    pub description: &'static str,
    pub body: &'static str,
}

pub const QUERY_TEMPLATES: &[QueryTemplate] = &[
    QueryTemplate {
        label: "match_all",
        description: "Match every document",
        body: r#"{
  "query": {
    "match_all": {}
  }
}"#,
    },
    QueryTemplate {
        label: "match",
        description: "Full-text match on one field",
        body: r#"{
  "query": {
    "match": {
      "field_name": "search text"
    }
  }
}"#,
    },
    QueryTemplate {
        label: "term",
        description: "Exact value on a keyword field",
        body: r#"{
  "query": {
    "term": {
      "field_name": "value"
    }
  }
}"#,
    },
    QueryTemplate {
        label: "range",
        description: "Range filter on a numeric or date field",
        body: r#"{
  "query": {
    "range": {
      "field_name": {
        "gte": 10,
        "lte": 20
      }
    }
  }
}"#,
    },
    QueryTemplate {
        label: "bool",
        description: "Boolean combination of clauses",
        body: r#"{
  "query": {
    "bool": {
      "must": [],
      "filter": [],
      "should": [],
      "must_not": []
    }
  }
}"#,
    },
    QueryTemplate {
        label: "multi_match",
        description: "Full-text match across several fields",
        body: r#"{
  "query": {
    "multi_match": {
      "query": "search text",
      "fields": ["field_one", "field_two^2"]
    }
  }
}"#,
    },
    QueryTemplate {
        label: "exists",
        description: "Documents where a field has any value",
        body: r#"{
  "query": {
    "exists": {
      "field": "field_name"
    }
  }
}"#,
    },
    QueryTemplate {
        label: "terms aggregation",
        description: "Bucket documents by field value",
        body: r#"{
  "size": 0,
  "aggs": {
    "group_by": {
      "terms": {
        "field": "field_name",
        "size": 10
      }
    }
  }
}"#,
    },
    QueryTemplate {
        label: "date_histogram aggregation",
        description: "Bucket documents per calendar interval",
        body: r#"{
  "size": 0,
  "aggs": {
    "over_time": {
      "date_histogram": {
        "field": "timestamp",
        "calendar_interval": "day"
      }
    }
  }
}"#,
    },
    QueryTemplate {
        label: "filter aggregation",
        description: "Aggregate over a filtered subset",
        body: r#"{
  "size": 0,
  "aggs": {
    "filtered": {
      "filter": {
        "term": { "field_name": "value" }
      },
      "aggs": {
        "average": {
          "avg": { "field": "numeric_field" }
        }
      }
    }
  }
}"#,
    },
    QueryTemplate {
        label: "query with aggregations",
        description: "Filtered search with nested aggregations",
        body: r#"{
  "query": {
    "bool": {
      "filter": [
        { "range": { "timestamp": { "gte": "now-7d" } } }
      ]
    }
  },
  "aggs": {
    "by_category": {
      "terms": { "field": "category" },
      "aggs": {
        "over_time": {
          "date_histogram": {
            "field": "timestamp",
            "calendar_interval": "day"
          }
        }
      }
    }
  },
  "size": 0
}"#,
    },
];

pub(crate) fn template_completions() -> Vec<CompletionItem> {
    QUERY_TEMPLATES
        .iter()
        .map(|template| CompletionItem {
            label: template.label.to_string(),
            kind: Some(CompletionItemKind::SNIPPET),
            detail: Some(template.description.to_string()),
            documentation: Some(Documentation::String(template.body.to_string())),
            insert_text: Some(template.body.to_string()),
            ..Default::default()
        })
        .collect()
}
