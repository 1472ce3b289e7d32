//! Visibility policies
//!
//! Decides whether a viewer may see one search hit. Each [`EntityKind`] has
//! its own policy; hits of an unrecognized type are always denied.
//!
//! Policies read the relationship graph through a [`PermissionStore`]. A
//! failed lookup is returned as an error and never turned into a verdict.

mod post;
mod user;

use vista_core::{
    is_set, paths, DenyReason, EntityKind, PostSnapshot, RawHit, TypeName, UserSnapshot, Verdict,
    VistaResult,
};
use vista_storage::PermissionStore;

/// Evaluates visibility policies against a permission store.
#[derive(Debug, Clone)]
pub struct VisibilityEvaluator<P> {
    store: P,
}

impl<P: PermissionStore> VisibilityEvaluator<P> {
    pub fn new(store: P) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Verdict for `viewer_id` seeing `hit`, a document of `type_name`.
    ///
    /// User hits are judged by their id; their source need not carry `userId`.
    pub async fn verdict(
        &self,
        type_name: &TypeName,
        hit: &RawHit,
        viewer_id: &str,
    ) -> VistaResult<Verdict> {
        match type_name.kind() {
            Some(EntityKind::Interest) => Ok(Verdict::Allow),
            Some(EntityKind::Post) => {
                let post = PostSnapshot::from_source(&hit.source);
                post::evaluate(&self.store, &post, viewer_id).await
            }
            Some(EntityKind::User) => {
                let user = UserSnapshot::from_source(hit.id.as_str(), &hit.source);
                user::evaluate(&self.store, &user, viewer_id).await
            }
            None => Ok(Verdict::Deny(DenyReason::UnrecognizedEntityType)),
        }
    }

    /// Whether `viewer_id` may see `hit`.
    pub async fn evaluate(
        &self,
        type_name: &TypeName,
        hit: &RawHit,
        viewer_id: &str,
    ) -> VistaResult<bool> {
        Ok(self.verdict(type_name, hit, viewer_id).await?.is_allowed())
    }
}

/// Whether `member` is in `owner`'s inner circle. Any truthy entry counts.
async fn in_inner_circle<P: PermissionStore>(
    store: &P,
    owner: &str,
    member: &str,
) -> VistaResult<bool> {
    let value = store.get(&paths::inner_circle(owner, member)).await?;
    Ok(is_set(value.as_ref()))
}
