//! Transport traits at either end of the pipeline.

use ::async_trait::async_trait;
use std::sync::Arc;
use vista_core::{InboundRequest, RequestKey, SearchResponse, VistaResult};

/// Stream of inbound search requests.
///
/// Delivery is at-least-once; the same key may arrive more than once.
#[async_trait]
pub trait RequestSource: Send {
    /// Wait for the next request. `Ok(None)` means the source is exhausted.
    async fn next_request(&mut self) -> VistaResult<Option<InboundRequest>>;
}

/// Destination for finished responses.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Publish `response` under the key of the request it answers.
    async fn publish(&self, key: &RequestKey, response: &SearchResponse) -> VistaResult<()>;
}

#[async_trait]
impl<T: ResponseSink + ?Sized> ResponseSink for Arc<T> {
    async fn publish(&self, key: &RequestKey, response: &SearchResponse) -> VistaResult<()> {
        (**self).publish(key, response).await
    }
}
