//! Newline-delimited JSON transport.
//!
//! Each input line is one request record, optionally carrying its own `key`:
//!
//! ```text
//! {"key":"-Nabc","userId":"A","in":"post,user","query":"bike"}
//! ```
//!
//! Each output line is `{"key": ..., "response": [...]}`.

use ::async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use vista_core::{
    InboundRequest, RawSearchRequest, RequestKey, SearchResponse, TransportError, VistaResult,
};

use crate::traits::{RequestSource, ResponseSink};

#[derive(Debug, Deserialize)]
struct RequestLine {
    #[serde(default)]
    key: Option<RequestKey>,
    #[serde(flatten)]
    record: RawSearchRequest,
}

#[derive(Debug, Serialize)]
struct ResponseLine<'a> {
    key: &'a RequestKey,
    response: &'a SearchResponse,
}

/// Reads one request per line. Blank lines, lines that are not UTF-8 and
/// lines that do not decode as a request are skipped.
pub struct JsonLinesRequestSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesRequestSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> RequestSource for JsonLinesRequestSource<R> {
    async fn next_request(&mut self) -> VistaResult<Option<InboundRequest>> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .await
                .map_err(|e| TransportError::SourceFailed {
                    reason: e.to_string(),
                })?;
            if read == 0 {
                return Ok(None);
            }

            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    tracing::info!(error = %e, "Skipping request line that is not UTF-8");
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<RequestLine>(line) {
                Ok(parsed) => {
                    let key = parsed.key.unwrap_or_else(RequestKey::generate);
                    return Ok(Some(InboundRequest::new(key, parsed.record)));
                }
                Err(e) => {
                    tracing::info!(error = %e, "Skipping undecodable request line");
                }
            }
        }
    }
}

/// Writes one response per line and flushes after each.
pub struct JsonLinesResponseSink<W> {
    writer: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesResponseSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ResponseSink for JsonLinesResponseSink<W> {
    async fn publish(&self, key: &RequestKey, response: &SearchResponse) -> VistaResult<()> {
        let failed = |reason: String| TransportError::PublishFailed {
            key: key.to_string(),
            reason,
        };

        let mut line = serde_json::to_vec(&ResponseLine { key, response })
            .map_err(|e| failed(e.to_string()))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(|e| failed(e.to_string()))?;
        writer.flush().await.map_err(|e| failed(e.to_string()))?;
        Ok(())
    }
}
