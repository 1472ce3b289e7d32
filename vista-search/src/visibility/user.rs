//! User policy.

use vista_core::{paths, DenyReason, LookMePrivacy, UserSnapshot, Verdict, VistaResult};
use vista_storage::PermissionStore;

use super::in_inner_circle;

/// Decide whether `viewer_id` may find `user` through search.
pub(super) async fn evaluate<P: PermissionStore>(
    store: &P,
    user: &UserSnapshot,
    viewer_id: &str,
) -> VistaResult<Verdict> {
    if user.user_id == viewer_id {
        return Ok(Verdict::Allow);
    }
    if user.is_blocked {
        return Ok(Verdict::Deny(DenyReason::Blocked));
    }

    let setting = store.get(&paths::privacy_look_me(&user.user_id)).await?;
    match LookMePrivacy::from_stored(setting.as_ref()) {
        LookMePrivacy::Everyone => Ok(Verdict::Allow),
        LookMePrivacy::InnerCircle => {
            let allowed = in_inner_circle(store, &user.user_id, viewer_id).await?;
            Ok(Verdict::allow_if(allowed, DenyReason::NotInLookMeCircle))
        }
        LookMePrivacy::Restricted(_) => Ok(Verdict::Deny(DenyReason::LookMeRestricted)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vista_storage::InMemoryPermissionStore;

    fn user(id: &str, is_blocked: bool) -> UserSnapshot {
        UserSnapshot {
            user_id: id.to_string(),
            is_blocked,
        }
    }

    #[tokio::test]
    async fn test_self_always_visible() {
        let store = InMemoryPermissionStore::new();
        store.set("privacy-look-me/U", json!(7));
        let verdict = evaluate(&store, &user("U", true), "U").await.unwrap();
        assert_eq!(verdict, Verdict::Allow);
    }

    #[tokio::test]
    async fn test_blocked_denied_for_others() {
        let store = InMemoryPermissionStore::new();
        let verdict = evaluate(&store, &user("U", true), "V").await.unwrap();
        assert_eq!(verdict, Verdict::Deny(DenyReason::Blocked));
    }

    #[tokio::test]
    async fn test_look_me_settings() {
        let store = InMemoryPermissionStore::new();
        let u = user("U", false);

        // Unset means everyone.
        assert_eq!(evaluate(&store, &u, "V").await.unwrap(), Verdict::Allow);

        store.set("privacy-look-me/U", json!("1"));
        assert_eq!(evaluate(&store, &u, "V").await.unwrap(), Verdict::Allow);

        store.set("privacy-look-me/U", json!(2));
        assert_eq!(
            evaluate(&store, &u, "V").await.unwrap(),
            Verdict::Deny(DenyReason::NotInLookMeCircle)
        );
        store.set("inner-circle/U/V", json!(true));
        assert_eq!(evaluate(&store, &u, "V").await.unwrap(), Verdict::Allow);

        store.set("privacy-look-me/U", json!(3));
        assert_eq!(
            evaluate(&store, &u, "V").await.unwrap(),
            Verdict::Deny(DenyReason::LookMeRestricted)
        );
    }
}
