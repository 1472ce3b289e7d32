//! Search index backed by an Elasticsearch `_msearch` endpoint.

use ::async_trait::async_trait;
use serde_json::Value;
use vista_core::{IndexError, TypeResult, VistaResult};

use crate::query::{msearch_ndjson, SubQuery};
use crate::traits::SearchIndex;

/// Connection settings for [`ElasticsearchIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElasticsearchConfig {
    /// Base URL, e.g. `http://localhost:9200`.
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            username: None,
            password: None,
        }
    }
}

impl ElasticsearchConfig {
    /// Create from environment variables.
    ///
    /// - `VISTA_ES_URL`: Base URL (default: http://localhost:9200)
    /// - `VISTA_ES_USER` / `VISTA_ES_PASS`: Basic auth, used only when both are set
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("VISTA_ES_URL").unwrap_or(defaults.base_url),
            username: std::env::var("VISTA_ES_USER").ok(),
            password: std::env::var("VISTA_ES_PASS").ok(),
        }
    }

    fn msearch_url(&self) -> String {
        format!("{}/_msearch", self.base_url.trim_end_matches('/'))
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

/// [`SearchIndex`] that issues one `_msearch` request per fan-out.
#[derive(Debug, Clone)]
pub struct ElasticsearchIndex {
    client: reqwest::Client,
    config: ElasticsearchConfig,
}

impl ElasticsearchIndex {
    pub fn new(config: ElasticsearchConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: ElasticsearchConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn msearch(&self, queries: &[SubQuery]) -> VistaResult<Vec<TypeResult>> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self
            .client
            .post(self.config.msearch_url())
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(msearch_ndjson(queries));
        if let Some((user, pass)) = self.config.credentials() {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await.map_err(request_failed)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::RequestFailed {
                reason: format!("status {}: {}", status, body),
            }
            .into());
        }

        let body: Value = response.json().await.map_err(|e| IndexError::Decode {
            reason: e.to_string(),
        })?;
        parse_msearch_response(body, queries.len())
    }
}

fn request_failed(e: reqwest::Error) -> IndexError {
    IndexError::RequestFailed {
        reason: e.to_string(),
    }
}

/// Split a multi-search response into one result per sub-query.
///
/// Fails if the response count differs from `expected` or any sub-response
/// carries an error.
pub fn parse_msearch_response(body: Value, expected: usize) -> VistaResult<Vec<TypeResult>> {
    let responses = match body {
        Value::Object(mut map) => match map.remove("responses") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(IndexError::Decode {
                    reason: "missing responses array".to_string(),
                }
                .into())
            }
        },
        _ => {
            return Err(IndexError::Decode {
                reason: "response is not an object".to_string(),
            }
            .into())
        }
    };

    if responses.len() != expected {
        return Err(IndexError::ResponseMismatch {
            expected,
            got: responses.len(),
        }
        .into());
    }

    responses
        .into_iter()
        .enumerate()
        .map(|(position, mut item)| -> VistaResult<TypeResult> {
            if let Some(error) = item.get("error") {
                return Err(IndexError::ShardFailure {
                    position,
                    reason: error.to_string(),
                }
                .into());
            }
            let hits = item.get_mut("hits").map(Value::take).unwrap_or(Value::Null);
            serde_json::from_value::<TypeResult>(hits).map_err(|e| {
                IndexError::Decode {
                    reason: format!("sub-query {}: {}", position, e),
                }
                .into()
            })
        })
        .collect()
}
