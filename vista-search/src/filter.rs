//! Visibility filtering of dispatched results.

use futures_util::future::try_join_all;
use vista_core::{
    EntityKind, FilteredTypeResult, IndexError, RawHit, SearchRequest, TypeName, TypeResult,
    VistaResult,
};
use vista_storage::PermissionStore;

use crate::visibility::VisibilityEvaluator;

/// Applies a [`VisibilityEvaluator`] to every hit of every type.
///
/// All hits of a type are evaluated concurrently, and types are filtered
/// concurrently with each other. Surviving hits keep their original order;
/// `max_score` and `total` are carried over from the unfiltered result.
#[derive(Debug, Clone)]
pub struct ResultFilter<P> {
    evaluator: VisibilityEvaluator<P>,
}

impl<P: PermissionStore> ResultFilter<P> {
    pub fn new(evaluator: VisibilityEvaluator<P>) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &VisibilityEvaluator<P> {
        &self.evaluator
    }

    /// Filter `results`, which must be index-aligned with `request.types`.
    pub async fn filter(
        &self,
        results: &[TypeResult],
        request: &SearchRequest,
    ) -> VistaResult<Vec<FilteredTypeResult>> {
        if results.len() != request.types.len() {
            return Err(IndexError::ResponseMismatch {
                expected: request.types.len(),
                got: results.len(),
            }
            .into());
        }

        let per_type = request
            .types
            .iter()
            .zip(results)
            .map(|(type_name, result)| self.filter_type(type_name, result, &request.viewer_id));
        try_join_all(per_type).await
    }

    /// Filter the hits of a single type.
    pub async fn filter_type(
        &self,
        type_name: &TypeName,
        result: &TypeResult,
        viewer_id: &str,
    ) -> VistaResult<FilteredTypeResult> {
        let kind = match type_name.kind() {
            Some(kind) => kind,
            None => {
                tracing::info!(
                    type_name = %type_name,
                    hits = result.hits.len(),
                    "No visibility policy for type, withholding all hits"
                );
                return Ok(FilteredTypeResult::retain(result, Vec::new()));
            }
        };

        let hits: Vec<RawHit> = result
            .hits
            .iter()
            .cloned()
            .map(|hit| match kind {
                EntityKind::User => hit.with_owner_id(),
                _ => hit,
            })
            .collect();

        let checks = hits
            .iter()
            .map(|hit| self.evaluator.evaluate(type_name, hit, viewer_id));
        let allowed = try_join_all(checks).await?;

        let kept = hits
            .into_iter()
            .zip(allowed)
            .filter_map(|(hit, allowed)| allowed.then_some(hit))
            .collect();
        Ok(FilteredTypeResult::retain(result, kept))
    }
}
