//! Search result types.
//!
//! Field names follow the search engine's response format so a
//! [`SearchResponse`] can be published as-is.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One matched document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    /// Engine metadata (`_index`, `_type`, ...) carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawHit {
    pub fn new(id: impl Into<String>, source: Map<String, Value>, score: f64) -> Self {
        Self {
            id: id.into(),
            source,
            score: Some(score),
            extra: Map::new(),
        }
    }

    /// Record the hit's own id as `userId` in its source.
    ///
    /// User documents are keyed by the user id and do not store it.
    pub fn with_owner_id(mut self) -> Self {
        self.source
            .insert("userId".to_string(), Value::String(self.id.clone()));
        self
    }
}

/// Unfiltered results for one requested type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeResult {
    #[serde(default)]
    pub hits: Vec<RawHit>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_total")]
    pub total: u64,
}

impl TypeResult {
    pub fn new(hits: Vec<RawHit>, max_score: Option<f64>, total: u64) -> Self {
        Self {
            hits,
            max_score,
            total,
        }
    }
}

/// Results for one type after visibility filtering.
///
/// `max_score` and `total` describe the unfiltered result and are never
/// recomputed, so `total` may exceed `hits.len()` even on the last page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredTypeResult {
    pub hits: Vec<RawHit>,
    pub max_score: Option<f64>,
    pub total: u64,
}

impl FilteredTypeResult {
    /// Keep `hits` while carrying the unfiltered metadata of `unfiltered`.
    pub fn retain(unfiltered: &TypeResult, hits: Vec<RawHit>) -> Self {
        Self {
            hits,
            max_score: unfiltered.max_score,
            total: unfiltered.total,
        }
    }
}

/// Filtered results, index-aligned with the request's types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchResponse(Vec<FilteredTypeResult>);

impl SearchResponse {
    pub fn new(results: Vec<FilteredTypeResult>) -> Self {
        Self(results)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FilteredTypeResult> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilteredTypeResult> {
        self.0.iter()
    }

    /// Total hits returned across all types.
    pub fn returned_hits(&self) -> usize {
        self.0.iter().map(|r| r.hits.len()).sum()
    }

    pub fn into_inner(self) -> Vec<FilteredTypeResult> {
        self.0
    }
}

/// Accept both a plain count and the `{ "value": n }` object form.
fn deserialize_total<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Total {
        Count(u64),
        Object { value: u64 },
    }

    Ok(match Total::deserialize(deserializer)? {
        Total::Count(n) => n,
        Total::Object { value } => value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_hit_wire_format() {
        let hit: RawHit = serde_json::from_value(json!({
            "_index": "staging",
            "_type": "post",
            "_id": "p1",
            "_score": 1.5,
            "_source": { "userId": "A", "name": "bike" }
        }))
        .unwrap();

        assert_eq!(hit.id, "p1");
        assert_eq!(hit.score, Some(1.5));
        assert_eq!(hit.source.get("userId"), Some(&json!("A")));
        assert_eq!(hit.extra.get("_type"), Some(&json!("post")));

        let back = serde_json::to_value(&hit).unwrap();
        assert_eq!(back["_index"], json!("staging"));
        assert_eq!(back["_source"]["name"], json!("bike"));
    }

    #[test]
    fn test_with_owner_id_overwrites_user_id() {
        let mut source = Map::new();
        source.insert("userId".to_string(), json!("someone-else"));
        let hit = RawHit::new("u1", source, 1.0).with_owner_id();
        assert_eq!(hit.source.get("userId"), Some(&json!("u1")));
    }

    #[test]
    fn test_total_accepts_both_forms() {
        let plain: TypeResult =
            serde_json::from_value(json!({ "hits": [], "max_score": null, "total": 7 })).unwrap();
        assert_eq!(plain.total, 7);
        assert_eq!(plain.max_score, None);

        let object: TypeResult = serde_json::from_value(
            json!({ "hits": [], "max_score": 2.0, "total": { "value": 9, "relation": "eq" } }),
        )
        .unwrap();
        assert_eq!(object.total, 9);
    }

    #[test]
    fn test_retain_keeps_unfiltered_metadata() {
        let unfiltered = TypeResult::new(
            vec![RawHit::new("a", Map::new(), 3.0), RawHit::new("b", Map::new(), 2.0)],
            Some(3.0),
            42,
        );
        let filtered = FilteredTypeResult::retain(&unfiltered, vec![]);
        assert!(filtered.hits.is_empty());
        assert_eq!(filtered.max_score, Some(3.0));
        assert_eq!(filtered.total, 42);
    }

    #[test]
    fn test_response_serializes_as_array() {
        let response = SearchResponse::new(vec![FilteredTypeResult::default()]);
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["total"], json!(0));
        assert_eq!(response.returned_hits(), 0);
    }
}
