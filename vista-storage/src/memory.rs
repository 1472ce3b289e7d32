//! In-memory store and index.
//!
//! Used by tests and local runs in place of the real backends. Both are
//! lock-free to read from concurrent requests.

use ::async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use vista_core::{RawHit, TypeResult, VistaResult};

use crate::query::SubQuery;
use crate::traits::{PermissionStore, SearchIndex};

// ============================================================================
// PERMISSION STORE
// ============================================================================

/// Relationship graph held as a flat map of path to value.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    values: DashMap<String, Value>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` at `path`, replacing any previous value.
    pub fn set(&self, path: impl Into<String>, value: Value) {
        self.values.insert(path.into(), value);
    }

    /// Remove the value at `path`.
    pub fn remove(&self, path: &str) {
        self.values.remove(path);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn get(&self, path: &str) -> VistaResult<Option<Value>> {
        Ok(self
            .values
            .get(path)
            .map(|entry| entry.value().clone())
            .filter(|value| !value.is_null()))
    }
}

// ============================================================================
// SEARCH INDEX
// ============================================================================

#[derive(Debug, Clone)]
struct StoredDocument {
    id: String,
    source: Map<String, Value>,
}

/// Documents grouped by type, searched by case-insensitive term match.
///
/// A document matches when its field shares at least one term with the query
/// text; its score is the number of shared terms. Matches are ranked by score,
/// ties in insertion order.
#[derive(Debug, Default)]
pub struct InMemorySearchIndex {
    documents: DashMap<String, Vec<StoredDocument>>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a document under `type_name`.
    pub fn insert(&self, type_name: &str, id: impl Into<String>, source: Map<String, Value>) {
        self.documents
            .entry(type_name.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.into(),
                source,
            });
    }

    fn search(&self, query: &SubQuery) -> TypeResult {
        let terms = tokenize(&query.query_text);
        let mut matches: Vec<(f64, StoredDocument)> = self
            .documents
            .get(query.type_name.as_str())
            .map(|docs| {
                docs.iter()
                    .filter_map(|doc| {
                        let score = score(doc.source.get(&query.field), &terms);
                        (score > 0.0).then(|| (score, doc.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Stable sort keeps insertion order among equal scores.
        matches.sort_by(|a, b| b.0.total_cmp(&a.0));

        let total = matches.len() as u64;
        let max_score = matches.first().map(|(score, _)| *score);
        let hits = matches
            .into_iter()
            .skip(query.from as usize)
            .take(query.size as usize)
            .map(|(score, doc)| {
                let mut hit = RawHit::new(doc.id, doc.source, score);
                hit.extra
                    .insert("_index".to_string(), Value::String(query.index.clone()));
                hit.extra.insert(
                    "_type".to_string(),
                    Value::String(query.type_name.to_string()),
                );
                hit
            })
            .collect();

        TypeResult::new(hits, max_score, total)
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn msearch(&self, queries: &[SubQuery]) -> VistaResult<Vec<TypeResult>> {
        Ok(queries.iter().map(|query| self.search(query)).collect())
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn score(field: Option<&Value>, terms: &[String]) -> f64 {
    let text = match field {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return 0.0,
    };
    let field_terms = tokenize(&text);
    terms
        .iter()
        .filter(|term| field_terms.contains(term))
        .count() as f64
}
