//! Permission store read over a realtime-database REST API.
//!
//! Each lookup is `GET {base_url}/{path}.json`, with an optional `auth` query
//! parameter. A JSON `null` body means nothing is stored at the path.

use ::async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use vista_core::{PermissionError, VistaResult};

use crate::traits::PermissionStore;

/// Connection settings for [`RestPermissionStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestStoreConfig {
    /// Database root, e.g. `https://example.firebaseio.com`.
    pub base_url: String,
    /// Token sent as the `auth` query parameter.
    pub auth_token: Option<String>,
}

impl RestStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
        }
    }

    /// Create from environment variables.
    ///
    /// - `VISTA_PERMISSION_URL`: Database root (required)
    /// - `VISTA_PERMISSION_AUTH`: Token sent with every read (optional)
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("VISTA_PERMISSION_URL").ok()?;
        Some(Self {
            base_url,
            auth_token: std::env::var("VISTA_PERMISSION_AUTH").ok(),
        })
    }

    /// URL of the value at `path`. Path segments are percent-encoded.
    pub fn url_for(&self, path: &str) -> Result<Url, PermissionError> {
        let invalid = |reason: String| PermissionError::LookupFailed {
            path: path.to_string(),
            reason,
        };

        let mut url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| invalid(format!("invalid base url: {}", e)))?;

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| invalid("empty path".to_string()))?;
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| invalid("base url cannot hold a path".to_string()))?;
            parts.pop_if_empty();
            parts.extend(parents.iter().copied());
            parts.push(&format!("{}.json", last));
        }

        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }
}

/// [`PermissionStore`] performing one HTTP read per lookup.
#[derive(Debug, Clone)]
pub struct RestPermissionStore {
    client: reqwest::Client,
    config: RestStoreConfig,
}

impl RestPermissionStore {
    pub fn new(config: RestStoreConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: RestStoreConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl PermissionStore for RestPermissionStore {
    async fn get(&self, path: &str) -> VistaResult<Option<Value>> {
        let url = self.config.url_for(path)?;
        let failed = |reason: String| PermissionError::LookupFailed {
            path: path.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("status {}", status)).into());
        }

        let value: Value = response.json().await.map_err(|e| PermissionError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        tracing::trace!(path, found = !value.is_null(), "Permission lookup");

        Ok(match value {
            Value::Null => None,
            other => Some(other),
        })
    }
}
