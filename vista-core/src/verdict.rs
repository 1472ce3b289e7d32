//! Visibility verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a hit was withheld from a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    Hidden,
    Offensive,
    OnlyMe,
    NotInInnerCircle,
    NotInSelectedCircles,
    NotSelected,
    UnrecognizedVisibility,
    Blocked,
    LookMeRestricted,
    NotInLookMeCircle,
    UnrecognizedEntityType,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            DenyReason::Hidden => "hidden",
            DenyReason::Offensive => "offensive",
            DenyReason::OnlyMe => "only_me",
            DenyReason::NotInInnerCircle => "not_in_inner_circle",
            DenyReason::NotInSelectedCircles => "not_in_selected_circles",
            DenyReason::NotSelected => "not_selected",
            DenyReason::UnrecognizedVisibility => "unrecognized_visibility",
            DenyReason::Blocked => "blocked",
            DenyReason::LookMeRestricted => "look_me_restricted",
            DenyReason::NotInLookMeCircle => "not_in_look_me_circle",
            DenyReason::UnrecognizedEntityType => "unrecognized_entity_type",
        };
        f.write_str(value)
    }
}

/// Outcome of one visibility check. Only `Allow` lets a hit through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    /// `Allow` when `allowed`, otherwise `Deny(reason)`.
    pub fn allow_if(allowed: bool, reason: DenyReason) -> Self {
        if allowed {
            Verdict::Allow
        } else {
            Verdict::Deny(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_if() {
        assert_eq!(Verdict::allow_if(true, DenyReason::Blocked), Verdict::Allow);
        assert_eq!(
            Verdict::allow_if(false, DenyReason::Blocked),
            Verdict::Deny(DenyReason::Blocked)
        );
    }

    #[test]
    fn test_only_allow_is_allowed() {
        assert!(Verdict::Allow.is_allowed());
        assert!(!Verdict::Deny(DenyReason::Hidden).is_allowed());
    }

    #[test]
    fn test_deny_reason_display() {
        assert_eq!(DenyReason::NotInInnerCircle.to_string(), "not_in_inner_circle");
    }
}
