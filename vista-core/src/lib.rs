//! VISTA Core - Search and Visibility Types
//!
//! Pure data structures shared by every VISTA crate: the request/response
//! model, entity snapshots read by visibility policies, relationship-graph
//! paths, errors and configuration. No I/O lives here.

pub mod config;
pub mod constants;
pub mod entity;
pub mod error;
pub mod paths;
pub mod request;
pub mod result;
pub mod value;
pub mod verdict;

pub use config::{ListenerConfig, SearchConfig, VistaConfig};
pub use entity::{EntityKind, LookMePrivacy, PostSnapshot, UserSnapshot, Visibility};
pub use error::{
    ConfigError, IndexError, PermissionError, TransportError, ValidationError, VistaError,
    VistaResult,
};
pub use request::{InboundRequest, RawSearchRequest, SearchRequest, TypeName};
pub use result::{FilteredTypeResult, RawHit, SearchResponse, TypeResult};
pub use value::{is_set, is_truthy};
pub use verdict::{DenyReason, Verdict};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// User identifier as stored in the relationship graph.
pub type UserId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Key of an inbound request; the response is published under the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generate a new time-sortable key (UUIDv7).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}
