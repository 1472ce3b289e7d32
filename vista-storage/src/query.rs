//! Sub-queries of a fan-out search.

use serde_json::{json, Value};
use vista_core::TypeName;

/// A full-text match of `query_text` against `field` within one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubQuery {
    pub index: String,
    pub type_name: TypeName,
    pub field: String,
    pub query_text: String,
    pub from: u32,
    pub size: u32,
}

impl SubQuery {
    /// Header line of this sub-query in a multi-search body.
    pub fn header(&self) -> Value {
        json!({ "index": self.index, "type": self.type_name.as_str() })
    }

    /// Body line of this sub-query in a multi-search body.
    pub fn body(&self) -> Value {
        let mut matcher = serde_json::Map::new();
        matcher.insert(self.field.clone(), Value::String(self.query_text.clone()));
        json!({
            "query": { "match": matcher },
            "from": self.from,
            "size": self.size,
        })
    }
}

/// Encode sub-queries as a newline-delimited multi-search body.
pub fn msearch_ndjson(queries: &[SubQuery]) -> String {
    let mut body = String::new();
    for query in queries {
        body.push_str(&query.header().to_string());
        body.push('\n');
        body.push_str(&query.body().to_string());
        body.push('\n');
    }
    body
}
