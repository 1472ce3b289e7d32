//! Request source backed by a bounded tokio mpsc channel.

use ::async_trait::async_trait;
use tokio::sync::mpsc;
use vista_core::{InboundRequest, RawSearchRequest, RequestKey, TransportError, VistaResult};

use crate::traits::RequestSource;

/// Create a connected submitter/source pair.
///
/// The source is exhausted once every submitter has been dropped and the
/// buffered requests have been drained.
pub fn request_channel(capacity: usize) -> (RequestSubmitter, ChannelRequestSource) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (RequestSubmitter { tx }, ChannelRequestSource { rx })
}

/// Producer half of [`request_channel`].
#[derive(Debug, Clone)]
pub struct RequestSubmitter {
    tx: mpsc::Sender<InboundRequest>,
}

impl RequestSubmitter {
    /// Submit a record under a freshly generated key and return that key.
    pub async fn submit(&self, record: RawSearchRequest) -> VistaResult<RequestKey> {
        let key = RequestKey::generate();
        self.submit_with_key(key.clone(), record).await?;
        Ok(key)
    }

    /// Submit a record under a caller-chosen key.
    pub async fn submit_with_key(&self, key: RequestKey, record: RawSearchRequest) -> VistaResult<()> {
        self.tx
            .send(InboundRequest::new(key, record))
            .await
            .map_err(|_| TransportError::SourceFailed {
                reason: "request channel closed".to_string(),
            })?;
        Ok(())
    }
}

/// Consumer half of [`request_channel`].
#[derive(Debug)]
pub struct ChannelRequestSource {
    rx: mpsc::Receiver<InboundRequest>,
}

#[async_trait]
impl RequestSource for ChannelRequestSource {
    async fn next_request(&mut self) -> VistaResult<Option<InboundRequest>> {
        Ok(self.rx.recv().await)
    }
}
