//! Property-Based Tests for Request Validation
//!
//! For any inbound record, validation SHALL accept it exactly when `userId`,
//! `query` and at least one non-blank type name are present, and the accepted
//! type list SHALL keep the submitted order with every entry trimmed.

use proptest::prelude::*;
use vista_core::{RawSearchRequest, SearchRequest, ValidationError};

fn type_list_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("post".to_string()),
            Just(" user ".to_string()),
            Just("interest".to_string()),
            Just(String::new()),
            Just("  ".to_string()),
        ],
        0..5,
    )
    .prop_map(|parts| parts.join(","))
}

fn optional_text_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), Just(Some(String::new())), "[a-z]{1,6}".prop_map(Some)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_validation_accepts_exactly_complete_records(
        user_id in optional_text_strategy(),
        types in prop::option::of(type_list_strategy()),
        query in optional_text_strategy(),
    ) {
        let raw = RawSearchRequest {
            user_id: user_id.clone(),
            types: types.clone(),
            query: query.clone(),
            field: None,
        };

        let has_user = user_id.as_deref().map(|s| !s.is_empty()).unwrap_or(false);
        let has_types = types
            .as_deref()
            .map(|list| list.split(',').any(|t| !t.trim().is_empty()))
            .unwrap_or(false);
        let has_query = query.as_deref().map(|s| !s.is_empty()).unwrap_or(false);

        match SearchRequest::try_from(raw) {
            Ok(request) => {
                prop_assert!(has_user && has_types && has_query);
                let expected: Vec<String> = types
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
                let got: Vec<String> = request.types.iter().map(|t| t.to_string()).collect();
                prop_assert_eq!(got, expected);
            }
            Err(ValidationError::RequiredFieldMissing { field }) => {
                prop_assert!(!(has_user && has_types && has_query));
                let first_missing = if !has_user {
                    "userId"
                } else if !has_types {
                    "in"
                } else {
                    "query"
                };
                prop_assert_eq!(field.as_str(), first_missing);
            }
        }
    }
}
