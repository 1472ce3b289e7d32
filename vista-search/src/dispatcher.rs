//! Search fan-out.
//!
//! One request becomes one sub-query per requested type, all sent to the
//! index in a single multi-search call.

use vista_core::{IndexError, SearchConfig, SearchRequest, TypeResult, VistaResult};
use vista_storage::{SearchIndex, SubQuery};

use vista_core::constants::SEARCH_FROM;

/// Builds sub-queries from a request and runs them against a [`SearchIndex`].
#[derive(Debug, Clone)]
pub struct SearchDispatcher<I> {
    index: I,
    config: SearchConfig,
}

impl<I: SearchIndex> SearchDispatcher<I> {
    pub fn new(index: I, config: SearchConfig) -> Self {
        Self { index, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// One sub-query per requested type, in request order.
    pub fn sub_queries(&self, request: &SearchRequest) -> Vec<SubQuery> {
        let field = request.field_or(&self.config.default_field);
        request
            .types
            .iter()
            .map(|type_name| SubQuery {
                index: self.config.index_name.clone(),
                type_name: type_name.clone(),
                field: field.to_string(),
                query_text: request.query.clone(),
                from: SEARCH_FROM,
                size: self.config.page_size,
            })
            .collect()
    }

    /// Run the request's sub-queries and return one result per type.
    ///
    /// Either every type gets a result or the whole dispatch fails.
    pub async fn dispatch(&self, request: &SearchRequest) -> VistaResult<Vec<TypeResult>> {
        let queries = self.sub_queries(request);
        let results = self.index.msearch(&queries).await?;

        if results.len() != queries.len() {
            return Err(IndexError::ResponseMismatch {
                expected: queries.len(),
                got: results.len(),
            }
            .into());
        }

        tracing::debug!(
            types = queries.len(),
            field = %queries.first().map(|q| q.field.as_str()).unwrap_or_default(),
            "Search dispatched"
        );
        Ok(results)
    }
}
