//! Loose truthiness over stored JSON values.
//!
//! Entity sources and relationship-graph entries are schemaless. A flag is
//! "set" when its value is truthy: anything except null, `false`, `0`, NaN and
//! the empty string. Arrays and objects are truthy even when empty.

use serde_json::Value;

/// Returns whether a stored value counts as set.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Truthiness of an optional value; a missing value is falsy.
pub fn is_set(value: Option<&Value>) -> bool {
    value.map(is_truthy).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_values() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_set(None));
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!(-2.5)));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_set(Some(&json!("yes"))));
    }
}
