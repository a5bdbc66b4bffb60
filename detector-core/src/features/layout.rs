//! Feature Layout - Centralized Feature Schemas
//!
//! **CRITICAL: This file controls the feature contract**
//!
//! A model only understands vectors in the exact order it was fit on.
//! Names never travel with a vector at inference time, so the schema
//! defined here is the only thing tying a request field to a column.
//!
//! ## Rules (NEVER break these):
//! 1. Add field → increment SCHEMA_VERSION
//! 2. Change order → increment SCHEMA_VERSION
//! 3. Remove field → increment SCHEMA_VERSION
//!
//! Two schemas coexist and are NOT compatible with each other:
//! - `url_features`: 12 hand-engineered URL features, sent as named fields
//! - `website_features`: the 30 UCI phishing dataset features, sent as a list

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// SCHEMA VERSION
// ============================================================================

/// Current schema layout version
/// MUST be incremented when a built-in layout changes
pub const SCHEMA_VERSION: u8 = 1;

/// Schema name for the 12-feature URL layout
pub const URL_FEATURES: &str = "url_features";

/// Schema name for the 30-feature website layout
pub const WEBSITE_FEATURES: &str = "website_features";

// ============================================================================
// FIELD TYPES
// ============================================================================

/// Value domain of a single feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Non-negative count or length
    Count,
    /// 0 / 1 indicator
    Flag,
    /// -1 / 0 / 1 encoded rule outcome (UCI convention)
    Ternary,
}

impl FieldKind {
    /// Whether `value` lies in this kind's domain
    pub fn contains(self, value: f64) -> bool {
        match self {
            FieldKind::Count => value.is_finite() && value >= 0.0 && value.fract() == 0.0,
            FieldKind::Flag => value == 0.0 || value == 1.0,
            FieldKind::Ternary => value == -1.0 || value == 0.0 || value == 1.0,
        }
    }
}

/// How clients submit features for a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestShape {
    /// JSON object, one key per field
    NamedFields,
    /// JSON object with a single `features` array in schema order
    OrderedList,
}

/// One named, typed column of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

// ============================================================================
// BUILT-IN LAYOUTS (Authoritative source)
// ============================================================================

/// URL feature layout, in the exact order the URL model was fit on
const URL_LAYOUT: &[(&str, FieldKind)] = &[
    ("url_length", FieldKind::Count),          // 0: Total URL length
    ("hostname_length", FieldKind::Count),     // 1: Hostname length
    ("dot_count", FieldKind::Count),           // 2: Number of '.'
    ("slash_count", FieldKind::Count),         // 3: Number of '/'
    ("has_ip", FieldKind::Flag),               // 4: Host is an IP literal
    ("has_special_chars", FieldKind::Flag),    // 5: '@', '-', '~' etc. present
    ("subdomain_count", FieldKind::Count),     // 6: Labels before the registered domain
    ("has_https", FieldKind::Flag),            // 7: Scheme is https
    ("has_sensitive_words", FieldKind::Flag),  // 8: login/verify/bank/...
    ("directory_count", FieldKind::Count),     // 9: Path segments
    ("query_param_count", FieldKind::Count),   // 10: Query parameters
    ("is_shortened", FieldKind::Flag),         // 11: Known shortener host
];

/// UCI website feature layout, in dataset column order
pub const WEBSITE_LAYOUT: &[&str] = &[
    "having_IP_Address",
    "URL_Length",
    "Shortining_Service",
    "having_At_Symbol",
    "double_slash_redirecting",
    "Prefix_Suffix",
    "having_Sub_Domain",
    "SSLfinal_State",
    "Domain_registeration_length",
    "Favicon",
    "port",
    "HTTPS_token",
    "Request_URL",
    "URL_of_Anchor",
    "Links_in_tags",
    "SFH",
    "Submitting_to_email",
    "Abnormal_URL",
    "Redirect",
    "on_mouseover",
    "RightClick",
    "popUpWidnow",
    "Iframe",
    "age_of_domain",
    "DNSRecord",
    "web_traffic",
    "Page_Rank",
    "Google_Index",
    "Links_pointing_to_page",
    "Statistical_report",
];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Unknown feature schema '{0}' (expected 'url_features' or 'website_features')")]
    Unknown(String),
}

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// Named, versioned, ordered feature contract.
///
/// Passed to both the request validator and the vector assembler so that
/// schema variants are data rather than separate code paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub name: String,
    pub version: u8,
    pub shape: RequestShape,
    pub fields: Vec<FieldSpec>,
}

impl FeatureSchema {
    pub fn new(name: &str, shape: RequestShape, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.to_string(),
            version: SCHEMA_VERSION,
            shape,
            fields,
        }
    }

    /// 12 named URL features (service variant A)
    pub fn url_features() -> Self {
        let fields = URL_LAYOUT
            .iter()
            .map(|(name, kind)| FieldSpec::new(name, *kind))
            .collect();
        Self::new(URL_FEATURES, RequestShape::NamedFields, fields)
    }

    /// 30 ordered UCI website features (service variant B)
    pub fn website_features() -> Self {
        let fields = WEBSITE_LAYOUT
            .iter()
            .map(|name| FieldSpec::new(name, FieldKind::Ternary))
            .collect();
        Self::new(WEBSITE_FEATURES, RequestShape::OrderedList, fields)
    }

    /// Look up a built-in schema by name
    pub fn by_name(name: &str) -> Result<Self, SchemaError> {
        match name.trim() {
            URL_FEATURES => Ok(Self::url_features()),
            WEBSITE_FEATURES => Ok(Self::website_features()),
            other => Err(SchemaError::Unknown(other.to_string())),
        }
    }

    pub fn feature_count(&self) -> usize {
        self.fields.len()
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Get field index by name (O(n) but fields are few)
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Get field name by index
    pub fn field_name(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(|f| f.name.as_str())
    }

    /// Names of fields whose value falls outside the field's domain.
    /// Values past the end of the schema are not checked.
    pub fn out_of_domain<'a>(&'a self, values: &[f64]) -> Vec<&'a str> {
        self.fields
            .iter()
            .zip(values)
            .filter(|(field, value)| !field.kind.contains(**value))
            .map(|(field, _)| field.name.as_str())
            .collect()
    }

    /// CRC32 over version and ordered field names.
    /// Used to detect layout drift between a model artifact and a schema.
    pub fn layout_hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&[self.version]);
        for field in &self.fields {
            hasher.update(field.name.as_bytes());
            hasher.update(&[0]); // Separator
        }
        hasher.finalize()
    }

    /// True when `names` lists exactly this schema's fields in order
    pub fn matches_names<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.len() == self.fields.len()
            && self
                .fields
                .iter()
                .zip(names)
                .all(|(field, name)| field.name == name.as_ref())
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            name: self.name.clone(),
            version: self.version,
            hash: self.layout_hash(),
            feature_count: self.feature_count(),
            feature_names: self.fields.iter().map(|f| f.name.clone()).collect(),
        }
    }
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub name: String,
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

// ============================================================================
// TESTS
// ============================================================================
