//! Search request types and validation.

use crate::{EntityKind, RequestKey, Timestamp, UserId, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of an entity type to search, as submitted by the caller.
///
/// Any non-empty name is accepted; names without a visibility policy still
/// run their sub-query but every hit is denied (see [`TypeName::kind`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The policy-bearing entity kind, or `None` if the name is unrecognized.
    pub fn kind(&self) -> Option<EntityKind> {
        self.0.parse().ok()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EntityKind> for TypeName {
    fn from(kind: EntityKind) -> Self {
        Self(kind.as_str().to_string())
    }
}

/// A search request exactly as delivered by the request source.
///
/// `in` holds a comma-separated list of type names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSearchRequest {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub types: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl RawSearchRequest {
    pub fn new(
        user_id: impl Into<String>,
        types: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            types: Some(types.into()),
            query: Some(query.into()),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Who is searching; every hit is checked against this viewer.
    pub viewer_id: UserId,
    /// Types to search, in response order. Duplicates are kept.
    pub types: Vec<TypeName>,
    /// Query text matched against `field`.
    pub query: String,
    /// Field to match; `None` means the configured default.
    pub field: Option<String>,
}

impl SearchRequest {
    /// Split a comma-separated type list, trimming each entry and dropping
    /// blank ones.
    pub fn parse_types(list: &str) -> Vec<TypeName> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(TypeName::new)
            .collect()
    }

    /// Field to match, falling back to `default_field`.
    pub fn field_or<'a>(&'a self, default_field: &'a str) -> &'a str {
        self.field.as_deref().unwrap_or(default_field)
    }
}

impl TryFrom<RawSearchRequest> for SearchRequest {
    type Error = ValidationError;

    fn try_from(raw: RawSearchRequest) -> Result<Self, Self::Error> {
        let viewer_id = non_empty(raw.user_id, "userId")?;
        let types = SearchRequest::parse_types(&non_empty(raw.types, "in")?);
        if types.is_empty() {
            return Err(missing("in"));
        }
        let query = non_empty(raw.query, "query")?;
        let field = raw.field.filter(|f| !f.trim().is_empty());

        Ok(Self {
            viewer_id,
            types,
            query,
            field,
        })
    }
}

fn non_empty(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| missing(field))
}

fn missing(field: &str) -> ValidationError {
    ValidationError::RequiredFieldMissing {
        field: field.to_string(),
    }
}

/// One item delivered by the request source.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundRequest {
    pub key: RequestKey,
    pub record: RawSearchRequest,
    pub received_at: Timestamp,
}

impl InboundRequest {
    pub fn new(key: RequestKey, record: RawSearchRequest) -> Self {
        Self {
            key,
            record,
            received_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request_is_accepted() {
        let raw = RawSearchRequest::new("A", "post, user ,interest", "bike");
        let req = SearchRequest::try_from(raw).unwrap();
        assert_eq!(req.viewer_id, "A");
        assert_eq!(
            req.types,
            vec![
                TypeName::new("post"),
                TypeName::new("user"),
                TypeName::new("interest")
            ]
        );
        assert_eq!(req.query, "bike");
        assert_eq!(req.field_or("name"), "name");
    }

    #[test]
    fn test_missing_fields_are_rejected_in_order() {
        let no_user = RawSearchRequest {
            user_id: None,
            ..RawSearchRequest::new("A", "post", "q")
        };
        assert_eq!(
            SearchRequest::try_from(no_user),
            Err(ValidationError::RequiredFieldMissing {
                field: "userId".to_string()
            })
        );

        let empty_in = RawSearchRequest::new("A", "", "q");
        assert_eq!(
            SearchRequest::try_from(empty_in),
            Err(ValidationError::RequiredFieldMissing {
                field: "in".to_string()
            })
        );

        let empty_query = RawSearchRequest::new("A", "post", "");
        assert_eq!(
            SearchRequest::try_from(empty_query),
            Err(ValidationError::RequiredFieldMissing {
                field: "query".to_string()
            })
        );
    }

    #[test]
    fn test_blank_type_list_is_rejected() {
        let raw = RawSearchRequest::new("A", " , ,", "q");
        assert!(SearchRequest::try_from(raw).is_err());
    }

    #[test]
    fn test_duplicate_types_are_kept() {
        let types = SearchRequest::parse_types("post,post");
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn test_explicit_field_overrides_default() {
        let raw = RawSearchRequest::new("A", "user", "ann").with_field("email");
        let req = SearchRequest::try_from(raw).unwrap();
        assert_eq!(req.field_or("name"), "email");

        let blank = RawSearchRequest::new("A", "user", "ann").with_field("  ");
        let req = SearchRequest::try_from(blank).unwrap();
        assert_eq!(req.field_or("name"), "name");
    }

    #[test]
    fn test_raw_request_wire_names() {
        let raw: RawSearchRequest = serde_json::from_str(
            r#"{"userId":"A","in":"post,user","query":"bike","field":"title"}"#,
        )
        .unwrap();
        assert_eq!(raw.user_id.as_deref(), Some("A"));
        assert_eq!(raw.types.as_deref(), Some("post,user"));
        assert_eq!(raw.field.as_deref(), Some("title"));

        let partial: RawSearchRequest = serde_json::from_str(r#"{"query":"bike"}"#).unwrap();
        assert!(partial.user_id.is_none());
    }

    #[test]
    fn test_type_name_kind() {
        assert_eq!(TypeName::new("post").kind(), Some(EntityKind::Post));
        assert_eq!(TypeName::new("group").kind(), None);
        assert_eq!(TypeName::from(EntityKind::User).as_str(), "user");
    }
}
