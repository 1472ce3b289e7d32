//! Request Listener
//!
//! Drains a [`RequestSource`] and runs the pipeline once per delivered
//! request, each on its own task. At most `max_in_flight` requests run at a
//! time; the source is not polled while the cap is reached.
//!
//! Shutdown takes priority over new work: once the signal is set, no further
//! request is taken from the source.
//!
//! The listener stops when the source is exhausted, the source fails, or the
//! shutdown signal is set. In every case it waits for in-flight requests to
//! finish before returning.
//!
//! ```ignore
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let listener = RequestListener::new(Arc::new(pipeline), ListenerConfig::default());
//! let handle = tokio::spawn(listener.run(source, shutdown_rx));
//!
//! // Later, trigger shutdown
//! let _ = shutdown_tx.send(true);
//! let metrics = handle.await?;
//! ```

use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinSet};
use vista_core::ListenerConfig;
use vista_events::{RequestSource, ResponseSink};
use vista_storage::{PermissionStore, SearchIndex};

use crate::pipeline::{PipelineOutcome, RequestPipeline};
use crate::telemetry::PipelineMetricsSnapshot;

/// Runs a shared [`RequestPipeline`] over a stream of inbound requests.
pub struct RequestListener<I, P, S> {
    pipeline: Arc<RequestPipeline<I, P, S>>,
    config: ListenerConfig,
}

impl<I, P, S> RequestListener<I, P, S>
where
    I: SearchIndex + 'static,
    P: PermissionStore + 'static,
    S: ResponseSink + 'static,
{
    pub fn new(pipeline: Arc<RequestPipeline<I, P, S>>, config: ListenerConfig) -> Self {
        Self { pipeline, config }
    }

    pub fn pipeline(&self) -> &Arc<RequestPipeline<I, P, S>> {
        &self.pipeline
    }

    /// Process requests from `source` until it ends or shutdown is signalled.
    ///
    /// Returns the pipeline metrics once every started request has finished.
    pub async fn run<R: RequestSource>(
        self,
        mut source: R,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> PipelineMetricsSnapshot {
        let max_in_flight = self.config.max_in_flight.max(1);
        let permits = Arc::new(Semaphore::new(max_in_flight));
        let mut tasks: JoinSet<PipelineOutcome> = JoinSet::new();

        tracing::info!(max_in_flight, "Request listener started");

        loop {
            let permit = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown_rx) => {
                    tracing::info!("Request listener shutting down");
                    break;
                }
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let next = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown_rx) => {
                    tracing::info!("Request listener shutting down");
                    break;
                }
                next = source.next_request() => next,
            };

            match next {
                Ok(Some(inbound)) => {
                    let pipeline = Arc::clone(&self.pipeline);
                    tasks.spawn(async move {
                        let _permit = permit;
                        pipeline.handle(inbound).await
                    });
                }
                Ok(None) => {
                    tracing::info!("Request source exhausted");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Request source failed");
                    break;
                }
            }

            while let Some(joined) = tasks.try_join_next() {
                log_joined(joined);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            log_joined(joined);
        }

        let snapshot = self.pipeline.metrics().snapshot();
        tracing::info!(
            received = snapshot.received,
            emitted = snapshot.emitted,
            rejected = snapshot.rejected,
            failed = snapshot.failed,
            hits_found = snapshot.hits_found,
            hits_returned = snapshot.hits_returned,
            "Request listener stopped"
        );
        snapshot
    }
}

/// Resolves once the shutdown flag is set. Never resolves if the sender is
/// dropped without setting it.
async fn wait_for_shutdown(shutdown_rx: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow_and_update() {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn log_joined(joined: Result<PipelineOutcome, JoinError>) {
    match joined {
        Ok(outcome) => {
            tracing::trace!(request_key = %outcome.key(), state = %outcome.state(), "Request finished");
        }
        Err(e) => {
            tracing::error!(error = %e, "Request task panicked or was cancelled");
        }
    }
}
