//! Labels and label vocabularies
//!
//! Datasets encode the outcome as `-1` (legitimate) / `1` (phishing).
//! Clients see one of two vocabularies depending on the service contract.

use serde::{Deserialize, Serialize};

/// Raw dataset value for a phishing row
pub const RAW_PHISHING: i64 = 1;

/// Raw dataset value for a legitimate row
pub const RAW_LEGITIMATE: i64 = -1;

/// Binary classifier outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Legitimate,
    Phishing,
}

impl Label {
    /// Decode a raw model output. Only `1` means phishing.
    pub fn from_raw(raw: i64) -> Self {
        if raw == RAW_PHISHING {
            Label::Phishing
        } else {
            Label::Legitimate
        }
    }

    /// Dataset encoding (`1` / `-1`)
    pub fn raw(self) -> i64 {
        match self {
            Label::Phishing => RAW_PHISHING,
            Label::Legitimate => RAW_LEGITIMATE,
        }
    }

    /// Wire encoding (`1` / `0`)
    pub fn binary(self) -> u8 {
        match self {
            Label::Phishing => 1,
            Label::Legitimate => 0,
        }
    }
}

/// Client-facing label names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelVocabulary {
    /// `"phishing"` / `"legitimate"`
    Lowercase,
    /// `"Phishing"` / `"Legitimate"`
    Capitalized,
}

impl LabelVocabulary {
    pub fn name(self, label: Label) -> &'static str {
        match (self, label) {
            (LabelVocabulary::Lowercase, Label::Phishing) => "phishing",
            (LabelVocabulary::Lowercase, Label::Legitimate) => "legitimate",
            (LabelVocabulary::Capitalized, Label::Phishing) => "Phishing",
            (LabelVocabulary::Capitalized, Label::Legitimate) => "Legitimate",
        }
    }
}
