//! Response sink that keeps everything it is given.

use ::async_trait::async_trait;
use dashmap::DashMap;
use vista_core::{RequestKey, SearchResponse, VistaResult};

use crate::traits::ResponseSink;

/// Records every published response, grouped by request key.
///
/// A key published twice keeps both responses, in publish order.
#[derive(Debug, Default)]
pub struct InMemoryResponseSink {
    responses: DashMap<RequestKey, Vec<SearchResponse>>,
}

impl InMemoryResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest response published under `key`.
    pub fn get(&self, key: &RequestKey) -> Option<SearchResponse> {
        self.responses
            .get(key)
            .and_then(|entry| entry.value().last().cloned())
    }

    /// Every response published under `key`.
    pub fn all(&self, key: &RequestKey) -> Vec<SearchResponse> {
        self.responses
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Total number of publishes across all keys.
    pub fn count(&self) -> usize {
        self.responses.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn keys(&self) -> Vec<RequestKey> {
        self.responses.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[async_trait]
impl ResponseSink for InMemoryResponseSink {
    async fn publish(&self, key: &RequestKey, response: &SearchResponse) -> VistaResult<()> {
        tracing::trace!(request_key = %key, types = response.len(), "Response recorded");
        self.responses
            .entry(key.clone())
            .or_default()
            .push(response.clone());
        Ok(())
    }
}
