//! Entity kinds and the typed snapshots visibility policies read.
//!
//! Sources are schemaless, so snapshots are read leniently: flags use
//! [`is_truthy`](crate::value::is_truthy) and malformed fields read as absent.

use crate::constants::{LOOK_ME_EVERYONE, LOOK_ME_INNER_CIRCLE, MODERATION_OFFENSIVE};
use crate::value::{is_set, is_truthy};
use crate::UserId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Entity kinds that carry a visibility policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Post,
    User,
    Interest,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Post => "post",
            EntityKind::User => "user",
            EntityKind::Interest => "interest",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(EntityKind::Post),
            "user" => Ok(EntityKind::User),
            "interest" => Ok(EntityKind::Interest),
            other => Err(format!("Unrecognized entity kind: {}", other)),
        }
    }
}

// ============================================================================
// POSTS
// ============================================================================

/// Audience a post author selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    Public,
    OnlyMe,
    InnerCircle,
    /// Circle ids; `None` when the stored value is not a list.
    OnlySelectedCircles(Option<Vec<String>>),
    /// User ids; `None` when the stored value is not a list.
    OnlySelectedUsers(Option<Vec<String>>),
    /// A type with no policy, including a missing type.
    Unrecognized(String),
}

impl Visibility {
    /// Read `{ "type": ..., "value": [...] }`. Returns `None` when the
    /// visibility entry itself is falsy.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !is_truthy(value) {
            return None;
        }
        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
        let list = |read: fn(&Value) -> Option<String>| -> Option<Vec<String>> {
            value
                .get("value")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(read).collect())
        };

        Some(match kind {
            "public" => Visibility::Public,
            "only-me" => Visibility::OnlyMe,
            "inner-circle" => Visibility::InnerCircle,
            "only-selected-circles" => Visibility::OnlySelectedCircles(list(id_text)),
            "only-selected-users" => Visibility::OnlySelectedUsers(list(string_only)),
            other => Visibility::Unrecognized(other.to_string()),
        })
    }
}

/// Circle ids and owner ids are path segments, so numbers keep their text form.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_only(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// The fields of a post document that decide its visibility.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostSnapshot {
    /// Author id in text form, used for relationship lookups.
    pub user_id: Option<UserId>,
    /// The stored author id was a number. Such a post is never authored by a
    /// viewer, whose id is always a string.
    pub numeric_author: bool,
    pub hidden: bool,
    pub moderation_type: Option<String>,
    pub visibility: Option<Visibility>,
}

impl PostSnapshot {
    pub fn from_source(source: &Map<String, Value>) -> Self {
        let author = source.get("userId");
        Self {
            user_id: author.and_then(id_text),
            numeric_author: author.map(Value::is_number).unwrap_or(false),
            hidden: is_set(source.get("hidden")),
            moderation_type: source
                .get("moderationType")
                .and_then(Value::as_str)
                .map(str::to_string),
            visibility: source.get("visibility").and_then(Visibility::from_value),
        }
    }

    pub fn is_authored_by(&self, viewer_id: &str) -> bool {
        !self.numeric_author && self.user_id.as_deref() == Some(viewer_id)
    }

    pub fn is_offensive(&self) -> bool {
        self.moderation_type.as_deref() == Some(MODERATION_OFFENSIVE)
    }
}

// ============================================================================
// USERS
// ============================================================================

/// The fields of a user document that decide its visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSnapshot {
    /// Always the hit id; user documents are keyed by user id.
    pub user_id: UserId,
    pub is_blocked: bool,
}

impl UserSnapshot {
    pub fn from_source(user_id: impl Into<UserId>, source: &Map<String, Value>) -> Self {
        Self {
            user_id: user_id.into(),
            is_blocked: is_set(source.get("isBlocked")),
        }
    }
}

/// Who may find a user through search.
#[derive(Debug, Clone, PartialEq)]
pub enum LookMePrivacy {
    Everyone,
    InnerCircle,
    /// Any other stored setting; nobody but the user.
    Restricted(Value),
}

impl LookMePrivacy {
    /// Interpret the stored setting. An unset or falsy value means everyone;
    /// `EVERYONE` also matches its string form, `INNER_CIRCLE` only the number.
    pub fn from_stored(value: Option<&Value>) -> Self {
        let value = match value {
            Some(v) if is_truthy(v) => v,
            _ => return LookMePrivacy::Everyone,
        };

        if value.is_number() && value.as_f64() == Some(LOOK_ME_INNER_CIRCLE as f64) {
            return LookMePrivacy::InnerCircle;
        }
        let everyone = value.as_f64() == Some(LOOK_ME_EVERYONE as f64)
            || value
                .as_str()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .map(|n| n == LOOK_ME_EVERYONE as f64)
                .unwrap_or(false)
            || *value == Value::Bool(true);
        if everyone {
            LookMePrivacy::Everyone
        } else {
            LookMePrivacy::Restricted(value.clone())
        }
    }
}
