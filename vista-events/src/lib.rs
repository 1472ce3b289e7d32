//! VISTA Events - Request Source and Response Sink
//!
//! The pipeline reads keyed search requests from a [`RequestSource`] and
//! publishes each finished response to a [`ResponseSink`] under the same key.
//! This crate defines both seams plus channel, JSON-lines and in-memory
//! implementations.

pub mod channel;
pub mod lines;
pub mod memory;
pub mod traits;

pub use channel::{request_channel, ChannelRequestSource, RequestSubmitter};
pub use lines::{JsonLinesRequestSource, JsonLinesResponseSink};
pub use memory::InMemoryResponseSink;
pub use traits::{RequestSource, ResponseSink};
