//! Async traits for the two stores the pipeline reads.
//!
//! Both are consumed read-only. Implementations must be safe to share
//! across concurrently running requests.

use ::async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use vista_core::{TypeResult, VistaResult};

use crate::query::SubQuery;

/// Key-value lookup over the relationship graph.
///
/// Paths are built with [`vista_core::paths`].
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Read the value at `path`, or `None` if nothing is stored there.
    ///
    /// A failed read is an error, never `None`.
    async fn get(&self, path: &str) -> VistaResult<Option<Value>>;
}

/// Multi-type search fan-out.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Execute every sub-query in one call.
    ///
    /// Returns one result per sub-query, in the same order. Any failure fails
    /// the whole call.
    async fn msearch(&self, queries: &[SubQuery]) -> VistaResult<Vec<TypeResult>>;
}

#[async_trait]
impl<T: PermissionStore + ?Sized> PermissionStore for Arc<T> {
    async fn get(&self, path: &str) -> VistaResult<Option<Value>> {
        (**self).get(path).await
    }
}

#[async_trait]
impl<T: SearchIndex + ?Sized> SearchIndex for Arc<T> {
    async fn msearch(&self, queries: &[SubQuery]) -> VistaResult<Vec<TypeResult>> {
        (**self).msearch(queries).await
    }
}
