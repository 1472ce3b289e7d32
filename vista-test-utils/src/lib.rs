//! VISTA Test Utilities
//!
//! Centralized test infrastructure for the VISTA workspace:
//! - Store, index and sink doubles that inject failures or track concurrency
//! - Proptest generators for requests, hits and relationship graphs
//! - Test fixtures for common scenarios
//! - Custom assertions for VISTA-specific validation

// Re-export core types for convenience
pub use vista_core::{
    DenyReason, EntityKind, FilteredTypeResult, InboundRequest, IndexError, PermissionError,
    RawHit, RawSearchRequest, RequestKey, SearchConfig, SearchRequest, SearchResponse,
    TransportError, TypeName, TypeResult, ValidationError, Verdict, VistaError, VistaResult,
};
pub use vista_events::{InMemoryResponseSink, ResponseSink};
pub use vista_storage::{
    InMemoryPermissionStore, InMemorySearchIndex, PermissionStore, SearchIndex, SubQuery,
};

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ============================================================================
// TEST DOUBLES
// ============================================================================

/// Permission store that fails every lookup under a path prefix.
///
/// Lookups outside the prefix are served by the wrapped in-memory store.
#[derive(Debug)]
pub struct FailingPermissionStore {
    inner: InMemoryPermissionStore,
    fail_prefix: String,
}

impl FailingPermissionStore {
    /// Fail every lookup.
    pub fn always() -> Self {
        Self::with_prefix("")
    }

    /// Fail lookups whose path starts with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            inner: InMemoryPermissionStore::new(),
            fail_prefix: prefix.into(),
        }
    }

    /// The store answering lookups outside the failing prefix.
    pub fn inner(&self) -> &InMemoryPermissionStore {
        &self.inner
    }
}

#[async_trait]
impl PermissionStore for FailingPermissionStore {
    async fn get(&self, path: &str) -> VistaResult<Option<Value>> {
        if path.starts_with(&self.fail_prefix) {
            return Err(PermissionError::LookupFailed {
                path: path.to_string(),
                reason: "injected failure".to_string(),
            }
            .into());
        }
        self.inner.get(path).await
    }
}

/// Search index whose every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSearchIndex;

#[async_trait]
impl SearchIndex for FailingSearchIndex {
    async fn msearch(&self, _queries: &[SubQuery]) -> VistaResult<Vec<TypeResult>> {
        Err(IndexError::RequestFailed {
            reason: "injected failure".to_string(),
        }
        .into())
    }
}

/// Response sink whose every publish fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingResponseSink;

#[async_trait]
impl ResponseSink for FailingResponseSink {
    async fn publish(&self, key: &RequestKey, _response: &SearchResponse) -> VistaResult<()> {
        Err(TransportError::PublishFailed {
            key: key.to_string(),
            reason: "injected failure".to_string(),
        }
        .into())
    }
}

/// Wraps an index, delaying each call and recording how many overlap.
#[derive(Debug)]
pub struct ConcurrencyTrackingIndex<I> {
    inner: I,
    delay: Duration,
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl<I: SearchIndex> ConcurrencyTrackingIndex<I> {
    pub fn new(inner: I, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Highest number of calls observed in flight at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I: SearchIndex> SearchIndex for ConcurrencyTrackingIndex<I> {
    async fn msearch(&self, queries: &[SubQuery]) -> VistaResult<Vec<TypeResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        let result = self.inner.msearch(queries).await;

        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Wraps a permission store, delaying each lookup and recording how many
/// overlap.
#[derive(Debug)]
pub struct ConcurrencyTrackingStore<P> {
    inner: P,
    delay: Duration,
    current: AtomicUsize,
    peak: AtomicUsize,
    lookups: AtomicUsize,
}

impl<P: PermissionStore> ConcurrencyTrackingStore<P> {
    pub fn new(inner: P, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Highest number of lookups observed in flight at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: PermissionStore> PermissionStore for ConcurrencyTrackingStore<P> {
    async fn get(&self, path: &str) -> VistaResult<Option<Value>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        let result = self.inner.get(path).await;

        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating VISTA inputs.
    //!
    //! User ids are drawn from a small pool so generated relationship graphs
    //! actually connect generated viewers and owners.

    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    /// Pool every generated user id is drawn from.
    pub const USER_POOL: &[&str] = &["alice", "bob", "carol", "dave"];

    /// Pool every generated circle id is drawn from.
    pub const CIRCLE_POOL: &[&str] = &["family", "work", "gym"];

    // === Identity Generators ===

    /// Generate a user id from [`USER_POOL`].
    pub fn arb_user_id() -> impl Strategy<Value = String> {
        prop::sample::select(USER_POOL).prop_map(str::to_string)
    }

    /// Generate a circle id from [`CIRCLE_POOL`].
    pub fn arb_circle_id() -> impl Strategy<Value = String> {
        prop::sample::select(CIRCLE_POOL).prop_map(str::to_string)
    }

    /// Generate a type name, mostly recognized kinds.
    pub fn arb_type_name() -> impl Strategy<Value = TypeName> {
        prop_oneof![
            4 => Just(TypeName::from(EntityKind::Post)),
            3 => Just(TypeName::from(EntityKind::User)),
            2 => Just(TypeName::from(EntityKind::Interest)),
            1 => Just(TypeName::new("group")),
        ]
    }

    // === Stored Value Generators ===

    /// Generate a JSON value with a mix of truthy and falsy members.
    pub fn arb_flag_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (0i64..3).prop_map(|n| json!(n)),
            prop::sample::select(vec!["", "yes", "1", "2"]).prop_map(|s| json!(s)),
        ]
    }

    /// Generate a post `visibility` object, or nothing.
    pub fn arb_visibility() -> impl Strategy<Value = Option<Value>> {
        prop_oneof![
            Just(None),
            Just(Some(json!({ "type": "public" }))),
            Just(Some(json!({ "type": "only-me" }))),
            Just(Some(json!({ "type": "inner-circle" }))),
            prop::collection::vec(arb_circle_id(), 0..3)
                .prop_map(|c| Some(json!({ "type": "only-selected-circles", "value": c }))),
            prop::collection::vec(arb_user_id(), 0..3)
                .prop_map(|u| Some(json!({ "type": "only-selected-users", "value": u }))),
            Just(Some(json!({ "type": "friends-of-friends" }))),
        ]
    }

    /// Generate a post `_source`.
    pub fn arb_post_source() -> impl Strategy<Value = Map<String, Value>> {
        (
            arb_user_id(),
            prop::option::of(arb_flag_value()),
            prop::option::of(prop::sample::select(vec!["offensive", "reviewed"])),
            arb_visibility(),
        )
            .prop_map(|(owner, hidden, moderation, visibility)| {
                let mut source = Map::new();
                source.insert("name".to_string(), json!("bike"));
                source.insert("userId".to_string(), json!(owner));
                if let Some(hidden) = hidden {
                    source.insert("hidden".to_string(), hidden);
                }
                if let Some(moderation) = moderation {
                    source.insert("moderationType".to_string(), json!(moderation));
                }
                if let Some(visibility) = visibility {
                    source.insert("visibility".to_string(), visibility);
                }
                source
            })
    }

    /// Generate a user `_source`. User documents never store their own id.
    pub fn arb_user_source() -> impl Strategy<Value = Map<String, Value>> {
        prop::option::of(arb_flag_value()).prop_map(|blocked| {
            let mut source = Map::new();
            source.insert("name".to_string(), json!("bike fan"));
            if let Some(blocked) = blocked {
                source.insert("isBlocked".to_string(), blocked);
            }
            source
        })
    }

    // === Result Generators ===

    /// Generate a hit of `type_name` with a matching source.
    pub fn arb_raw_hit(type_name: TypeName) -> impl Strategy<Value = RawHit> {
        let source = match type_name.kind() {
            Some(EntityKind::Post) => arb_post_source().boxed(),
            Some(EntityKind::User) => arb_user_source().boxed(),
            _ => Just(Map::new()).boxed(),
        };
        let is_user = type_name.kind() == Some(EntityKind::User);
        (arb_user_id(), source, 0.1f64..10.0).prop_map(move |(user_id, source, score)| {
            let id = if is_user { user_id } else { format!("doc-{}", user_id) };
            RawHit::new(id, source, score)
        })
    }

    /// Generate an unfiltered result for `type_name`.
    pub fn arb_type_result(type_name: TypeName) -> impl Strategy<Value = TypeResult> {
        (
            prop::collection::vec(arb_raw_hit(type_name), 0..8),
            prop::option::of(0.1f64..10.0),
            0u64..100,
        )
            .prop_map(|(hits, max_score, extra)| {
                let total = hits.len() as u64 + extra;
                TypeResult::new(hits, max_score, total)
            })
    }

    /// Generate a request with its index-aligned unfiltered results.
    pub fn arb_request_with_results() -> impl Strategy<Value = (SearchRequest, Vec<TypeResult>)> {
        (arb_user_id(), prop::collection::vec(arb_type_name(), 1..4)).prop_flat_map(
            |(viewer_id, types)| {
                let results: Vec<_> = types.iter().cloned().map(arb_type_result).collect();
                let request = SearchRequest {
                    viewer_id,
                    types,
                    query: "bike".to_string(),
                    field: None,
                };
                (Just(request), results)
            },
        )
    }

    // === Request Generators ===

    /// Generate a record that passes validation.
    pub fn arb_valid_raw_request() -> impl Strategy<Value = RawSearchRequest> {
        (
            arb_user_id(),
            prop::collection::vec(arb_type_name(), 1..4),
            "[a-z]{1,8}( [a-z]{1,8})?",
        )
            .prop_map(|(user_id, types, query)| {
                let list = types
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                RawSearchRequest::new(user_id, list, query)
            })
    }

    /// Generate a record that fails validation.
    pub fn arb_invalid_raw_request() -> impl Strategy<Value = RawSearchRequest> {
        (arb_valid_raw_request(), 0usize..5).prop_map(|(mut raw, defect)| {
            match defect {
                0 => raw.user_id = None,
                1 => raw.user_id = Some(String::new()),
                2 => raw.types = Some(" , ,".to_string()),
                3 => raw.query = None,
                _ => raw.query = Some(String::new()),
            }
            raw
        })
    }

    // === Relationship Graph Generators ===

    /// Generate relationship-graph entries over [`USER_POOL`].
    pub fn arb_permission_entries() -> impl Strategy<Value = Vec<(String, Value)>> {
        let inner_circle = (arb_user_id(), arb_user_id(), arb_flag_value())
            .prop_map(|(owner, member, v)| (vista_core::paths::inner_circle(&owner, &member), v));
        let circle = (arb_user_id(), arb_circle_id(), arb_user_id(), arb_flag_value()).prop_map(
            |(owner, circle, member, v)| {
                (vista_core::paths::circle_users(&owner, &circle, &member), v)
            },
        );
        let look_me = (arb_user_id(), arb_flag_value())
            .prop_map(|(owner, v)| (vista_core::paths::privacy_look_me(&owner), v));

        prop::collection::vec(prop_oneof![inner_circle, circle, look_me], 0..12)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;
    use serde_json::json;

    /// Unwrap a JSON object into a source map; anything else is empty.
    pub fn source(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// A post by `owner` with the given `visibility` object.
    pub fn post_source(owner: &str, visibility: Option<Value>) -> Map<String, Value> {
        let mut map = source(json!({ "name": "red bike", "userId": owner }));
        if let Some(visibility) = visibility {
            map.insert("visibility".to_string(), visibility);
        }
        map
    }

    /// Store seeded with entries.
    pub fn store_with(entries: &[(String, Value)]) -> InMemoryPermissionStore {
        let store = InMemoryPermissionStore::new();
        for (path, value) in entries {
            store.set(path.clone(), value.clone());
        }
        store
    }

    /// Index holding the same documents the pipeline scenarios use:
    ///
    /// - posts `p-public` (alice), `p-hidden` (alice), `p-inner` (alice, inner-circle)
    /// - user `bob`
    /// - interest `i-bikes`
    pub fn scenario_index() -> InMemorySearchIndex {
        let index = InMemorySearchIndex::new();
        index.insert("post", "p-public", post_source("alice", Some(json!({ "type": "public" }))));
        let mut hidden = post_source("alice", None);
        hidden.insert("hidden".to_string(), json!(true));
        index.insert("post", "p-hidden", hidden);
        index.insert(
            "post",
            "p-inner",
            post_source("alice", Some(json!({ "type": "inner-circle" }))),
        );
        index.insert("user", "bob", source(json!({ "name": "bike bob" })));
        index.insert("interest", "i-bikes", source(json!({ "name": "bikes and bike trips" })));
        index
    }

    /// A valid record searching every scenario type for "bike".
    pub fn scenario_request(viewer: &str) -> RawSearchRequest {
        RawSearchRequest::new(viewer, "post,user,interest", "bike")
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for VISTA-specific validation.

    use super::*;

    /// Assert that a VistaResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &VistaResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a VistaResult is an Index error.
    #[track_caller]
    pub fn assert_index_error<T: std::fmt::Debug>(result: &VistaResult<T>) {
        match result {
            Err(VistaError::Index(_)) => {}
            other => panic!("Expected Index error, got: {:?}", other),
        }
    }

    /// Assert that a VistaResult is a Permission error.
    #[track_caller]
    pub fn assert_permission_error<T: std::fmt::Debug>(result: &VistaResult<T>) {
        match result {
            Err(VistaError::Permission(_)) => {}
            other => panic!("Expected Permission error, got: {:?}", other),
        }
    }

    /// Assert that every filtered result keeps its unfiltered metadata and
    /// only holds hits from the unfiltered result, in their original order.
    #[track_caller]
    pub fn assert_filtered_subset(unfiltered: &[TypeResult], filtered: &[FilteredTypeResult]) {
        assert_eq!(unfiltered.len(), filtered.len(), "Result count changed");
        for (before, after) in unfiltered.iter().zip(filtered) {
            assert_eq!(before.total, after.total, "total was recomputed");
            assert_eq!(before.max_score, after.max_score, "max_score was recomputed");

            let mut remaining = before.hits.iter();
            for hit in &after.hits {
                assert!(
                    remaining.any(|candidate| candidate.id == hit.id),
                    "Hit {} is not from the unfiltered result or is out of order",
                    hit.id
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_store_respects_prefix() {
        let store = FailingPermissionStore::with_prefix("circle-users/");
        store.inner().set("inner-circle/a/b", serde_json::json!(true));

        assert!(store.get("circle-users/a/c/b").await.is_err());
        assert_eq!(
            store.get("inner-circle/a/b").await.unwrap(),
            Some(serde_json::json!(true))
        );
        assert!(FailingPermissionStore::always().get("anything").await.is_err());
    }

    #[tokio::test]
    async fn test_tracking_index_counts_calls() {
        let tracked = ConcurrencyTrackingIndex::new(InMemorySearchIndex::new(), Duration::from_millis(1));
        tracked.msearch(&[]).await.unwrap();
        tracked.msearch(&[]).await.unwrap();
        assert_eq!(tracked.calls(), 2);
        assert_eq!(tracked.peak(), 1);
    }

    #[tokio::test]
    async fn test_tracking_store_serves_inner_values() {
        let tracked =
            ConcurrencyTrackingStore::new(InMemoryPermissionStore::new(), Duration::from_millis(1));
        tracked.inner().set("inner-circle/a/b", serde_json::json!(1));

        assert_eq!(
            tracked.get("inner-circle/a/b").await.unwrap(),
            Some(serde_json::json!(1))
        );
        assert_eq!(tracked.get("inner-circle/a/c").await.unwrap(), None);
        assert_eq!(tracked.lookups(), 2);
        assert_eq!(tracked.peak(), 1);
    }
}
