//! Post policy.

use futures_util::future::try_join_all;
use vista_core::{paths, DenyReason, PostSnapshot, Verdict, Visibility, VistaResult};
use vista_storage::PermissionStore;

use super::in_inner_circle;

/// Decide whether `viewer_id` may see `post`.
///
/// Checks run in order: hidden, authorship, moderation, then the post's
/// visibility setting. A post without a setting is public.
pub(super) async fn evaluate<P: PermissionStore>(
    store: &P,
    post: &PostSnapshot,
    viewer_id: &str,
) -> VistaResult<Verdict> {
    // Hidden wins over authorship.
    if post.hidden {
        return Ok(Verdict::Deny(DenyReason::Hidden));
    }
    if post.is_authored_by(viewer_id) {
        return Ok(Verdict::Allow);
    }
    if post.is_offensive() {
        return Ok(Verdict::Deny(DenyReason::Offensive));
    }

    let visibility = match &post.visibility {
        Some(visibility) => visibility,
        None => return Ok(Verdict::Allow),
    };

    match visibility {
        Visibility::Public => Ok(Verdict::Allow),
        Visibility::OnlyMe => Ok(Verdict::Deny(DenyReason::OnlyMe)),
        Visibility::InnerCircle => {
            let allowed = match post.user_id.as_deref() {
                Some(owner) => in_inner_circle(store, owner, viewer_id).await?,
                None => false,
            };
            Ok(Verdict::allow_if(allowed, DenyReason::NotInInnerCircle))
        }
        Visibility::OnlySelectedCircles(circles) => {
            let allowed = match (post.user_id.as_deref(), circles) {
                (Some(owner), Some(circles)) => {
                    in_any_circle(store, owner, circles, viewer_id).await?
                }
                _ => false,
            };
            Ok(Verdict::allow_if(allowed, DenyReason::NotInSelectedCircles))
        }
        Visibility::OnlySelectedUsers(users) => {
            let allowed = users
                .as_ref()
                .map(|users| users.iter().any(|u| u == viewer_id))
                .unwrap_or(false);
            Ok(Verdict::allow_if(allowed, DenyReason::NotSelected))
        }
        Visibility::Unrecognized(kind) => {
            tracing::trace!(visibility = %kind, "Unrecognized post visibility");
            Ok(Verdict::Deny(DenyReason::UnrecognizedVisibility))
        }
    }
}

/// Whether `member` belongs to at least one of `owner`'s `circles`.
///
/// Lookups run concurrently; any failure fails the whole check. Membership
/// requires the stored value to be exactly `true`.
async fn in_any_circle<P: PermissionStore>(
    store: &P,
    owner: &str,
    circles: &[String],
    member: &str,
) -> VistaResult<bool> {
    let lookups = circles.iter().map(|circle| async move {
        let value = store.get(&paths::circle_users(owner, circle, member)).await?;
        Ok::<bool, vista_core::VistaError>(value == Some(serde_json::Value::Bool(true)))
    });
    let members = try_join_all(lookups).await?;
    Ok(members.into_iter().any(|is_member| is_member))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vista_storage::InMemoryPermissionStore;

    fn post(owner: &str, visibility: Option<Visibility>) -> PostSnapshot {
        PostSnapshot {
            user_id: Some(owner.to_string()),
            numeric_author: false,
            hidden: false,
            moderation_type: None,
            visibility,
        }
    }

    async fn verdict(store: &InMemoryPermissionStore, post: &PostSnapshot, viewer: &str) -> Verdict {
        evaluate(store, post, viewer).await.unwrap()
    }

    #[tokio::test]
    async fn test_hidden_denied_even_for_author() {
        let store = InMemoryPermissionStore::new();
        let mut p = post("A", Some(Visibility::Public));
        p.hidden = true;
        assert_eq!(verdict(&store, &p, "A").await, Verdict::Deny(DenyReason::Hidden));
        assert_eq!(verdict(&store, &p, "B").await, Verdict::Deny(DenyReason::Hidden));
    }

    #[tokio::test]
    async fn test_author_sees_own_restricted_posts() {
        let store = InMemoryPermissionStore::new();
        let mut p = post("A", Some(Visibility::OnlyMe));
        p.moderation_type = Some("offensive".to_string());
        assert_eq!(verdict(&store, &p, "A").await, Verdict::Allow);
        assert_eq!(verdict(&store, &p, "B").await, Verdict::Deny(DenyReason::Offensive));
    }

    #[tokio::test]
    async fn test_missing_visibility_and_public_allowed() {
        let store = InMemoryPermissionStore::new();
        assert_eq!(verdict(&store, &post("A", None), "B").await, Verdict::Allow);
        assert_eq!(
            verdict(&store, &post("A", Some(Visibility::Public)), "B").await,
            Verdict::Allow
        );
        assert_eq!(
            verdict(&store, &post("A", Some(Visibility::OnlyMe)), "B").await,
            Verdict::Deny(DenyReason::OnlyMe)
        );
    }

    #[tokio::test]
    async fn test_inner_circle_uses_truthy_entry() {
        let store = InMemoryPermissionStore::new();
        let p = post("A", Some(Visibility::InnerCircle));
        assert_eq!(
            verdict(&store, &p, "B").await,
            Verdict::Deny(DenyReason::NotInInnerCircle)
        );

        store.set("inner-circle/A/B", json!(1));
        assert_eq!(verdict(&store, &p, "B").await, Verdict::Allow);

        store.set("inner-circle/A/B", json!(0));
        assert!(!verdict(&store, &p, "B").await.is_allowed());
    }

    #[tokio::test]
    async fn test_selected_circles_any_membership() {
        let store = InMemoryPermissionStore::new();
        store.set("circle-users/A/c2/B", json!(true));
        store.set("circle-users/A/c1/C", json!("yes"));

        let p = post(
            "A",
            Some(Visibility::OnlySelectedCircles(Some(vec![
                "c1".to_string(),
                "c2".to_string(),
            ]))),
        );
        assert_eq!(verdict(&store, &p, "B").await, Verdict::Allow);
        // Only an exact `true` counts as membership.
        assert_eq!(
            verdict(&store, &p, "C").await,
            Verdict::Deny(DenyReason::NotInSelectedCircles)
        );

        let empty = post("A", Some(Visibility::OnlySelectedCircles(Some(Vec::new()))));
        assert!(!verdict(&store, &empty, "B").await.is_allowed());
        let missing = post("A", Some(Visibility::OnlySelectedCircles(None)));
        assert!(!verdict(&store, &missing, "B").await.is_allowed());
    }

    #[tokio::test]
    async fn test_selected_users_membership() {
        let store = InMemoryPermissionStore::new();
        let p = post(
            "A",
            Some(Visibility::OnlySelectedUsers(Some(vec!["B".to_string()]))),
        );
        assert_eq!(verdict(&store, &p, "B").await, Verdict::Allow);
        assert_eq!(verdict(&store, &p, "C").await, Verdict::Deny(DenyReason::NotSelected));
        assert!(!verdict(&store, &post("A", Some(Visibility::OnlySelectedUsers(None))), "B")
            .await
            .is_allowed());
    }

    #[tokio::test]
    async fn test_unrecognized_visibility_denied() {
        let store = InMemoryPermissionStore::new();
        let p = post("A", Some(Visibility::Unrecognized("friends".to_string())));
        assert_eq!(
            verdict(&store, &p, "B").await,
            Verdict::Deny(DenyReason::UnrecognizedVisibility)
        );
    }

    #[tokio::test]
    async fn test_authorless_post_cannot_match_relationships() {
        let store = InMemoryPermissionStore::new();
        let mut p = post("A", Some(Visibility::InnerCircle));
        p.user_id = None;
        assert!(!verdict(&store, &p, "B").await.is_allowed());
    }
}
