//! Background jobs for the search service.

pub mod listener;

pub use listener::RequestListener;
