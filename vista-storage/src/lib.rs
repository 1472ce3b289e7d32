//! VISTA Storage - Permission Store and Search Index
//!
//! Defines the two read-only stores the search pipeline depends on and
//! provides in-memory and HTTP implementations of each.

pub mod elasticsearch;
pub mod memory;
pub mod query;
pub mod rest_store;
pub mod traits;

pub use elasticsearch::{parse_msearch_response, ElasticsearchConfig, ElasticsearchIndex};
pub use memory::{InMemoryPermissionStore, InMemorySearchIndex};
pub use query::{msearch_ndjson, SubQuery};
pub use rest_store::{RestPermissionStore, RestStoreConfig};
pub use traits::{PermissionStore, SearchIndex};
