//! Feature Vector - Core data structure for model input
//!
//! Carries the layout hash of the schema that assembled it, so a vector
//! can be traced back to the field order it was built from.

use serde::{Deserialize, Serialize};

use super::layout::FeatureSchema;

/// Ordered numeric model input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// CRC32 hash of the assembling schema's layout
    pub layout_hash: u32,
    /// Feature values in schema order
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(schema: &FeatureSchema, values: Vec<f64>) -> Self {
        Self {
            layout_hash: schema.layout_hash(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Get feature by name, resolved through `schema`
    pub fn get_by_name(&self, schema: &FeatureSchema, name: &str) -> Option<f64> {
        schema.field_index(name).and_then(|i| self.get(i))
    }

    /// True when this vector was assembled by `schema`
    pub fn is_compatible(&self, schema: &FeatureSchema) -> bool {
        self.layout_hash == schema.layout_hash() && self.len() == schema.feature_count()
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self, schema: &FeatureSchema) -> serde_json::Value {
        let named: serde_json::Map<String, serde_json::Value> = schema
            .fields
            .iter()
            .zip(&self.values)
            .map(|(field, value)| (field.name.clone(), serde_json::json!(value)))
            .collect();

        serde_json::json!({
            "schema": schema.name,
            "layout_hash": format!("{:08x}", self.layout_hash),
            "values": self.values,
            "named_values": named,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_carries_layout_hash() {
        let schema = FeatureSchema::url_features();
        let vector = FeatureVector::new(&schema, vec![0.0; 12]);
        assert_eq!(vector.layout_hash, schema.layout_hash());
        assert!(vector.is_compatible(&schema));
        assert!(!vector.is_compatible(&FeatureSchema::website_features()));
    }

    #[test]
    fn test_get_by_name() {
        let schema = FeatureSchema::url_features();
        let values: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let vector = FeatureVector::new(&schema, values);
        assert_eq!(vector.get_by_name(&schema, "dot_count"), Some(2.0));
        assert_eq!(vector.get_by_name(&schema, "missing"), None);
        assert_eq!(vector.get(42), None);
    }

    #[test]
    fn test_log_entry_names_values() {
        let schema = FeatureSchema::url_features();
        let vector = FeatureVector::new(&schema, vec![1.0; 12]);
        let entry = vector.to_log_entry(&schema);
        assert_eq!(entry["schema"], "url_features");
        assert_eq!(entry["named_values"]["has_https"], 1.0);
    }
}
