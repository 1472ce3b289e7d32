//! Relationship-graph paths.
//!
//! Every permission lookup is a point read at one of these paths.

/// Inner-circle membership of `member` under `owner`.
pub fn inner_circle(owner: &str, member: &str) -> String {
    format!("inner-circle/{}/{}", owner, member)
}

/// Membership of `member` in circle `circle_id` owned by `owner`.
pub fn circle_users(owner: &str, circle_id: &str, member: &str) -> String {
    format!("circle-users/{}/{}/{}", owner, circle_id, member)
}

/// Who may look up `owner` in search.
pub fn privacy_look_me(owner: &str) -> String {
    format!("privacy-look-me/{}", owner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_paths() {
        assert_eq!(inner_circle("A", "B"), "inner-circle/A/B");
        assert_eq!(circle_users("A", "c1", "B"), "circle-users/A/c1/B");
        assert_eq!(privacy_look_me("A"), "privacy-look-me/A");
    }
}
