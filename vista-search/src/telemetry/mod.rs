//! VISTA Telemetry - Logging and Pipeline Metrics
//!
//! Structured JSON logging through `tracing-subscriber`, plus in-process
//! counters describing what the pipeline has done since startup.

pub mod metrics;
pub mod tracer;

pub use metrics::{PipelineMetrics, PipelineMetricsSnapshot};
pub use tracer::{init_tracing, DEFAULT_LOG_FILTER};
