//! Request Validation - feature contract checks
//!
//! Turns an untrusted JSON body into a `FeatureVector`, in this order:
//! 1. body is well-formed JSON
//! 2. required field(s) present
//! 3. feature count matches what the loaded model expects
//! 4. every value is numeric-coercible
//!
//! The first failing check wins; the outcome is an explicit `Result` so the
//! response mapper never has to catch anything.

use serde_json::Value;
use thiserror::Error;

use super::layout::{FeatureSchema, RequestShape};
use super::vector::FeatureVector;

/// Key holding the ordered list for `RequestShape::OrderedList`
pub const FEATURES_KEY: &str = "features";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Request body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field '{0}' must be a list of numbers")]
    NotAList(String),

    #[error("Feature shape mismatch, expected: {expected}, got {received}")]
    ShapeMismatch { expected: usize, received: usize },

    #[error("Feature '{field}' is not numeric: {value}")]
    NotNumeric { field: String, value: String },
}

/// Step 1: parse raw bytes. Content type is deliberately not consulted.
pub fn parse_body(body: &[u8]) -> Result<Value, ValidationError> {
    serde_json::from_slice(body).map_err(|e| ValidationError::MalformedBody(e.to_string()))
}

/// Step 3 on its own, for callers that assemble vectors without a body
pub fn check_shape(expected: usize, received: usize) -> Result<(), ValidationError> {
    if expected != received {
        return Err(ValidationError::ShapeMismatch { expected, received });
    }
    Ok(())
}

/// Steps 2-4: validate a parsed body against `schema` and the model's
/// expected feature count, and assemble the ordered vector.
pub fn validate_request(
    schema: &FeatureSchema,
    expected: usize,
    body: &Value,
) -> Result<FeatureVector, ValidationError> {
    let object = body.as_object().ok_or(ValidationError::NotAnObject)?;

    // Collect (name, raw value) pairs in schema order
    let raw: Vec<(String, &Value)> = match schema.shape {
        RequestShape::NamedFields => schema
            .fields
            .iter()
            .map(|field| {
                object
                    .get(&field.name)
                    .map(|v| (field.name.clone(), v))
                    .ok_or_else(|| ValidationError::MissingField(field.name.clone()))
            })
            .collect::<Result<_, _>>()?,
        RequestShape::OrderedList => {
            let list = object
                .get(FEATURES_KEY)
                .ok_or_else(|| ValidationError::MissingField(FEATURES_KEY.to_string()))?
                .as_array()
                .ok_or_else(|| ValidationError::NotAList(FEATURES_KEY.to_string()))?;

            list.iter()
                .enumerate()
                .map(|(i, v)| {
                    let name = schema
                        .field_name(i)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("{}[{}]", FEATURES_KEY, i));
                    (name, v)
                })
                .collect()
        }
    };

    check_shape(expected, raw.len())?;

    let values = raw
        .into_iter()
        .map(|(field, value)| {
            coerce_numeric(value).ok_or_else(|| ValidationError::NotNumeric {
                field,
                value: value.to_string(),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    // Out-of-domain values are accepted as-is
    let unusual = schema.out_of_domain(&values);
    if !unusual.is_empty() {
        log::debug!("Values outside their field domain: {:?}", unusual);
    }

    Ok(FeatureVector::new(schema, values))
}

/// Numeric coercion: finite numbers, booleans as 0/1, and strings holding a
/// finite number. Everything else (null, arrays, objects) is rejected.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url_example() -> Value {
        json!({
            "url_length": 54, "hostname_length": 12, "dot_count": 2,
            "slash_count": 3, "has_ip": 0, "has_special_chars": 0,
            "subdomain_count": 1, "has_https": 1, "has_sensitive_words": 0,
            "directory_count": 1, "query_param_count": 0, "is_shortened": 0
        })
    }

    #[test]
    fn test_parse_body_rejects_garbage() {
        assert!(matches!(parse_body(b"{not json"), Err(ValidationError::MalformedBody(_))));
        assert!(parse_body(br#"{"features": []}"#).is_ok());
    }

    #[test]
    fn test_named_fields_assembled_in_schema_order() {
        let schema = FeatureSchema::url_features();
        let vector = validate_request(&schema, 12, &url_example()).unwrap();
        assert_eq!(vector.values[0], 54.0);
        assert_eq!(vector.values[1], 12.0);
        assert_eq!(vector.values[7], 1.0);
        assert_eq!(vector.layout_hash, schema.layout_hash());
    }

    #[test]
    fn test_out_of_domain_values_still_accepted() {
        let schema = FeatureSchema::url_features();
        let mut body = url_example();
        body["has_ip"] = json!(7);
        body["url_length"] = json!(-1);
        let vector = validate_request(&schema, 12, &body).unwrap();
        assert_eq!(vector.values[0], -1.0);
        assert_eq!(vector.values[4], 7.0);
    }

    #[test]
    fn test_named_fields_ignores_extra_keys() {
        let schema = FeatureSchema::url_features();
        let mut body = url_example();
        body["unexpected"] = json!("whatever");
        assert!(validate_request(&schema, 12, &body).is_ok());
    }

    #[test]
    fn test_missing_field() {
        let schema = FeatureSchema::url_features();
        let mut body = url_example();
        body.as_object_mut().unwrap().remove("has_ip");
        assert_eq!(
            validate_request(&schema, 12, &body),
            Err(ValidationError::MissingField("has_ip".to_string()))
        );
    }

    #[test]
    fn test_named_fields_shape_mismatch_reports_both_counts() {
        let schema = FeatureSchema::url_features();
        let err = validate_request(&schema, 30, &url_example()).unwrap_err();
        assert_eq!(err, ValidationError::ShapeMismatch { expected: 30, received: 12 });
        let msg = err.to_string();
        assert!(msg.contains("30") && msg.contains("12"));
    }

    #[test]
    fn test_ordered_list_shape_mismatch() {
        let schema = FeatureSchema::website_features();
        let err = validate_request(&schema, 30, &json!({"features": [1, 2, 3]})).unwrap_err();
        assert_eq!(err, ValidationError::ShapeMismatch { expected: 30, received: 3 });
    }

    #[test]
    fn test_ordered_list_missing_and_wrong_type() {
        let schema = FeatureSchema::website_features();
        assert_eq!(
            validate_request(&schema, 30, &json!({"values": []})),
            Err(ValidationError::MissingField("features".to_string()))
        );
        assert_eq!(
            validate_request(&schema, 30, &json!({"features": "1,2,3"})),
            Err(ValidationError::NotAList("features".to_string()))
        );
    }

    #[test]
    fn test_shape_checked_before_types() {
        // Wrong count AND bad values: the count error wins
        let schema = FeatureSchema::website_features();
        let err = validate_request(&schema, 30, &json!({"features": ["x"]})).unwrap_err();
        assert!(matches!(err, ValidationError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_not_numeric_names_field() {
        let schema = FeatureSchema::website_features();
        let mut values = vec![json!(1); 30];
        values[5] = json!("abc");
        let err = validate_request(&schema, 30, &json!({ "features": values })).unwrap_err();
        match err {
            ValidationError::NotNumeric { field, .. } => assert_eq!(field, "Prefix_Suffix"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_not_an_object() {
        let schema = FeatureSchema::website_features();
        assert_eq!(
            validate_request(&schema, 30, &json!([1, 2, 3])),
            Err(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn test_coerce_numeric() {
        assert_eq!(coerce_numeric(&json!(3)), Some(3.0));
        assert_eq!(coerce_numeric(&json!(-1.5)), Some(-1.5));
        assert_eq!(coerce_numeric(&json!(true)), Some(1.0));
        assert_eq!(coerce_numeric(&json!(" 7 ")), Some(7.0));
        assert_eq!(coerce_numeric(&json!("NaN")), None);
        assert_eq!(coerce_numeric(&json!(null)), None);
        assert_eq!(coerce_numeric(&json!([1])), None);
    }
}
