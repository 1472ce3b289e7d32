//! VISTA Search - Search Fan-Out with Visibility Filtering
//!
//! Takes a viewer's search request, fans it out across entity types in a
//! single multi-search call, and drops every hit the viewer is not allowed
//! to see before publishing the response.
//!
//! # Architecture
//!
//! ```text
//! RequestSource -> RequestPipeline -> SearchDispatcher -> SearchIndex
//!                        |
//!                        +-> ResultFilter -> VisibilityEvaluator -> PermissionStore
//!                        |
//!                        +-> ResponseSink
//! ```
//!
//! [`RequestListener`] drives a pipeline from a request source with a cap
//! on concurrently running requests.

pub mod dispatcher;
pub mod filter;
pub mod jobs;
pub mod pipeline;
pub mod telemetry;
pub mod visibility;

pub use dispatcher::SearchDispatcher;
pub use filter::ResultFilter;
pub use jobs::RequestListener;
pub use pipeline::{PipelineOutcome, RequestPipeline, RequestState};
pub use telemetry::{init_tracing, PipelineMetrics, PipelineMetricsSnapshot};
pub use visibility::VisibilityEvaluator;
