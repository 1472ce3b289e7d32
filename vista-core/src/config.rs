//! Configuration types
//!
//! Every setting has a default and can be overridden through a `VISTA_*`
//! environment variable. Unparseable overrides fall back to the default;
//! `validate` rejects values that parse but make no sense.

use crate::constants::{
    DEFAULT_INDEX_NAME, DEFAULT_MAX_IN_FLIGHT, DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_FIELD,
};
use crate::{ConfigError, VistaResult};
use serde::{Deserialize, Serialize};

/// Sub-query construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Index every sub-query targets.
    pub index_name: String,
    /// Field matched when the request names none.
    pub default_field: String,
    /// Hits fetched per type.
    pub page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            default_field: DEFAULT_SEARCH_FIELD.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `VISTA_INDEX_NAME`: Index to search (default: staging)
    /// - `VISTA_DEFAULT_FIELD`: Field matched when the request names none (default: name)
    /// - `VISTA_PAGE_SIZE`: Hits fetched per type (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            index_name: std::env::var("VISTA_INDEX_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.index_name),
            default_field: std::env::var("VISTA_DEFAULT_FIELD")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.default_field),
            page_size: std::env::var("VISTA_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.page_size),
        }
    }

    pub fn validate(&self) -> VistaResult<()> {
        if self.page_size == 0 {
            return Err(invalid(
                "page_size",
                self.page_size.to_string(),
                "page_size must be greater than 0",
            ));
        }
        if self.index_name.trim().is_empty() {
            return Err(invalid(
                "index_name",
                self.index_name.clone(),
                "index_name must not be empty",
            ));
        }
        if self.default_field.trim().is_empty() {
            return Err(invalid(
                "default_field",
                self.default_field.clone(),
                "default_field must not be empty",
            ));
        }
        Ok(())
    }
}

/// Request listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Requests processed concurrently.
    pub max_in_flight: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl ListenerConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `VISTA_MAX_IN_FLIGHT`: Concurrent requests per listener (default: 64)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_in_flight: std::env::var("VISTA_MAX_IN_FLIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_in_flight),
        }
    }

    pub fn validate(&self) -> VistaResult<()> {
        if self.max_in_flight == 0 {
            return Err(invalid(
                "max_in_flight",
                self.max_in_flight.to_string(),
                "max_in_flight must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Master configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VistaConfig {
    pub search: SearchConfig,
    pub listener: ListenerConfig,
}

impl VistaConfig {
    pub fn from_env() -> Self {
        Self {
            search: SearchConfig::from_env(),
            listener: ListenerConfig::from_env(),
        }
    }

    pub fn validate(&self) -> VistaResult<()> {
        self.search.validate()?;
        self.listener.validate()
    }
}

fn invalid(field: &str, value: String, reason: &str) -> crate::VistaError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
        reason: reason.to_string(),
    }
    .into()
}

// =============================================================================
// TESTS
// =============================================================================
