//! Request Pipeline
//!
//! Runs one inbound request end to end:
//!
//! ```text
//! Received -> Validated -> Dispatched -> Filtered -> Emitted
//!    |            |            |            |
//!    v            +------------+------------+--> Failed
//! Rejected
//! ```
//!
//! Invalid requests are dropped without a response. Any failure after
//! validation (index, permission store or sink) ends the run with nothing
//! emitted.

use std::fmt;
use std::sync::Arc;

use vista_core::{
    InboundRequest, RequestKey, SearchConfig, SearchRequest, SearchResponse, TypeResult,
    ValidationError, VistaError, VistaResult,
};
use vista_events::ResponseSink;
use vista_storage::{PermissionStore, SearchIndex};

use crate::dispatcher::SearchDispatcher;
use crate::filter::ResultFilter;
use crate::telemetry::PipelineMetrics;
use crate::visibility::VisibilityEvaluator;

// ============================================================================
// STATE
// ============================================================================

/// Lifecycle state of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    Received,
    Validated,
    Dispatched,
    Filtered,
    Emitted,
    Rejected,
    Failed,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Emitted | RequestState::Rejected | RequestState::Failed
        )
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RequestState::Received => "received",
            RequestState::Validated => "validated",
            RequestState::Dispatched => "dispatched",
            RequestState::Filtered => "filtered",
            RequestState::Emitted => "emitted",
            RequestState::Rejected => "rejected",
            RequestState::Failed => "failed",
        };
        f.write_str(value)
    }
}

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The response was published under `key`.
    Emitted {
        key: RequestKey,
        response: SearchResponse,
    },
    /// The request was invalid; nothing was published.
    Rejected {
        key: RequestKey,
        error: ValidationError,
    },
    /// The run failed after reaching `state`; nothing was published.
    Failed {
        key: RequestKey,
        state: RequestState,
        error: VistaError,
    },
}

impl PipelineOutcome {
    pub fn key(&self) -> &RequestKey {
        match self {
            PipelineOutcome::Emitted { key, .. }
            | PipelineOutcome::Rejected { key, .. }
            | PipelineOutcome::Failed { key, .. } => key,
        }
    }

    /// Terminal state of the run.
    pub fn state(&self) -> RequestState {
        match self {
            PipelineOutcome::Emitted { .. } => RequestState::Emitted,
            PipelineOutcome::Rejected { .. } => RequestState::Rejected,
            PipelineOutcome::Failed { .. } => RequestState::Failed,
        }
    }

    pub fn response(&self) -> Option<&SearchResponse> {
        match self {
            PipelineOutcome::Emitted { response, .. } => Some(response),
            _ => None,
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Validates, dispatches, filters and emits search requests.
///
/// Holds no per-request state, so one pipeline serves any number of
/// concurrent requests.
pub struct RequestPipeline<I, P, S> {
    dispatcher: SearchDispatcher<I>,
    filter: ResultFilter<P>,
    sink: S,
    metrics: Arc<PipelineMetrics>,
}

impl<I, P, S> RequestPipeline<I, P, S>
where
    I: SearchIndex,
    P: PermissionStore,
    S: ResponseSink,
{
    pub fn new(index: I, store: P, sink: S, config: SearchConfig) -> Self {
        Self {
            dispatcher: SearchDispatcher::new(index, config),
            filter: ResultFilter::new(VisibilityEvaluator::new(store)),
            sink,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Share `metrics` with other pipelines or observers.
    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Search and filter a validated request without publishing anything.
    pub async fn process(&self, request: &SearchRequest) -> VistaResult<SearchResponse> {
        let results = self.dispatcher.dispatch(request).await?;
        let filtered = self.filter.filter(&results, request).await?;
        Ok(SearchResponse::new(filtered))
    }

    /// Run one inbound request to a terminal state.
    pub async fn handle(&self, inbound: InboundRequest) -> PipelineOutcome {
        let InboundRequest { key, record, .. } = inbound;
        PipelineMetrics::incr(&self.metrics.received);

        let request = match SearchRequest::try_from(record) {
            Ok(request) => request,
            Err(error) => {
                tracing::info!(request_key = %key, error = %error, "Dropping invalid search request");
                PipelineMetrics::incr(&self.metrics.rejected);
                return PipelineOutcome::Rejected { key, error };
            }
        };

        let types = request
            .types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",");
        tracing::debug!(
            request_key = %key,
            viewer_id = %request.viewer_id,
            types = %types,
            query = %request.query,
            "Search request validated"
        );

        let results = match self.dispatcher.dispatch(&request).await {
            Ok(results) => results,
            Err(error) => return self.fail(key, RequestState::Validated, error),
        };
        let found = count_hits(&results);
        PipelineMetrics::add(&self.metrics.hits_found, found);

        let filtered = match self.filter.filter(&results, &request).await {
            Ok(filtered) => filtered,
            Err(error) => return self.fail(key, RequestState::Dispatched, error),
        };
        let response = SearchResponse::new(filtered);
        let returned = response.returned_hits() as u64;
        PipelineMetrics::add(&self.metrics.hits_returned, returned);

        tracing::info!(
            request_key = %key,
            viewer_id = %request.viewer_id,
            types = %types,
            found,
            returned,
            "Search request filtered"
        );

        if let Err(error) = self.sink.publish(&key, &response).await {
            return self.fail(key, RequestState::Filtered, error);
        }

        PipelineMetrics::incr(&self.metrics.emitted);
        PipelineOutcome::Emitted { key, response }
    }

    fn fail(&self, key: RequestKey, state: RequestState, error: VistaError) -> PipelineOutcome {
        tracing::error!(
            request_key = %key,
            state = %state,
            error = %error,
            "Search request failed"
        );
        PipelineMetrics::incr(&self.metrics.failed);
        PipelineOutcome::Failed { key, state, error }
    }
}

fn count_hits(results: &[TypeResult]) -> u64 {
    results.iter().map(|r| r.hits.len() as u64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};
    use vista_core::{RawSearchRequest, TransportError};
    use vista_events::InMemoryResponseSink;
    use vista_storage::{InMemoryPermissionStore, InMemorySearchIndex};

    fn doc(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn pipeline() -> RequestPipeline<InMemorySearchIndex, InMemoryPermissionStore, InMemoryResponseSink>
    {
        let index = InMemorySearchIndex::new();
        index.insert("post", "p1", doc(json!({ "name": "red bike", "userId": "A" })));
        index.insert(
            "post",
            "p2",
            doc(json!({ "name": "bike", "userId": "A", "visibility": { "type": "only-me" } })),
        );
        index.insert("user", "U", doc(json!({ "name": "bike fan" })));

        RequestPipeline::new(
            index,
            InMemoryPermissionStore::new(),
            InMemoryResponseSink::new(),
            SearchConfig::default(),
        )
    }

    fn inbound(key: &str, record: RawSearchRequest) -> InboundRequest {
        InboundRequest::new(RequestKey::from(key), record)
    }

    #[tokio::test]
    async fn test_valid_request_emits_filtered_response() {
        let pipeline = pipeline();
        let outcome = pipeline
            .handle(inbound("k1", RawSearchRequest::new("V", "post,user", "bike")))
            .await;

        assert_eq!(outcome.state(), RequestState::Emitted);
        let response = outcome.response().unwrap();
        assert_eq!(response.len(), 2);
        let posts = response.get(0).unwrap();
        assert_eq!(posts.hits.len(), 1);
        assert_eq!(posts.hits[0].id, "p1");
        assert_eq!(posts.total, 2);
        let users = response.get(1).unwrap();
        assert_eq!(users.hits[0].source.get("userId"), Some(&json!("U")));

        assert_eq!(pipeline.sink().get(&RequestKey::from("k1")).as_ref(), Some(response));

        let metrics = pipeline.metrics().snapshot();
        assert_eq!(metrics.received, 1);
        assert_eq!(metrics.emitted, 1);
        assert_eq!(metrics.hits_found, 3);
        assert_eq!(metrics.hits_returned, 2);
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_silently() {
        let pipeline = pipeline();
        let mut record = RawSearchRequest::new("V", "post", "bike");
        record.query = Some(String::new());

        let outcome = pipeline.handle(inbound("k1", record)).await;
        assert_eq!(
            outcome,
            PipelineOutcome::Rejected {
                key: RequestKey::from("k1"),
                error: ValidationError::RequiredFieldMissing {
                    field: "query".to_string()
                },
            }
        );
        assert_eq!(pipeline.sink().count(), 0);
        assert_eq!(pipeline.metrics().snapshot().rejected, 1);
    }

    struct ClosedSink;

    #[::async_trait::async_trait]
    impl ResponseSink for ClosedSink {
        async fn publish(&self, key: &RequestKey, _response: &SearchResponse) -> VistaResult<()> {
            Err(TransportError::PublishFailed {
                key: key.to_string(),
                reason: "closed".to_string(),
            }
            .into())
        }
    }

    #[tokio::test]
    async fn test_sink_failure_is_failed_outcome() {
        let pipeline = RequestPipeline::new(
            InMemorySearchIndex::new(),
            InMemoryPermissionStore::new(),
            ClosedSink,
            SearchConfig::default(),
        );
        let outcome = pipeline
            .handle(inbound("k1", RawSearchRequest::new("V", "post", "bike")))
            .await;

        match outcome {
            PipelineOutcome::Failed { state, error, .. } => {
                assert_eq!(state, RequestState::Filtered);
                assert!(matches!(error, VistaError::Transport(_)));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(pipeline.metrics().snapshot().failed, 1);
    }

    #[tokio::test]
    async fn test_process_does_not_publish() {
        let pipeline = pipeline();
        let request =
            SearchRequest::try_from(RawSearchRequest::new("A", "post", "bike")).unwrap();
        let response = pipeline.process(&request).await.unwrap();

        // The author sees their only-me post.
        assert_eq!(response.get(0).map(|r| r.hits.len()), Some(2));
        assert_eq!(pipeline.sink().count(), 0);
    }

    #[test]
    fn test_terminal_states() {
        assert!(RequestState::Emitted.is_terminal());
        assert!(RequestState::Rejected.is_terminal());
        assert!(RequestState::Failed.is_terminal());
        assert!(!RequestState::Dispatched.is_terminal());
        assert_eq!(RequestState::Filtered.to_string(), "filtered");
    }
}
