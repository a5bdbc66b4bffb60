//! URL Heuristics - website features from a bare URL
//!
//! Fills the 30-field `website_features` layout from nothing but the URL
//! string, using the same rules as the browser extension. Fields that need
//! page content (favicon, anchors, iframes, ...) or external lookups
//! (page rank, DNS) cannot be observed from a URL and are reported as
//! legitimate (-1).

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::layout::{FeatureSchema, WEBSITE_LAYOUT};
use super::vector::FeatureVector;

const PHISHING: f64 = 1.0;
const SUSPICIOUS: f64 = 0.0;
const LEGITIMATE: f64 = -1.0;

static URL_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*):(?://(?:[^@/?#]*@)?(?P<host>\[[^\]]*\]|[^:/?#]*)(?::(?P<port>\d*))?)?",
    )
    .expect("URL regex is valid")
});
static IPV4_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\d+\.\d+\.\d+").expect("IPv4 regex is valid"));
static SHORTENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(bit\.ly|goo\.gl|tinyurl\.com|ow\.ly|t\.co)").expect("shortener regex is valid")
});
static ABNORMAL_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(login|verify|update|secure|account)").expect("abnormal regex is valid")
});
static REDIRECT_HINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(redirect|rurl|url=|dest=|out=|view=)").expect("redirect regex is valid")
});
static REPORTED_BRANDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(paypal|allegro|bank|secure|account)").expect("brand regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Invalid URL: {0}")]
    Invalid(String),
}

/// Pieces of a URL the heuristics look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: String,
    /// Lowercased host, without userinfo or port
    pub host: String,
    /// Explicit non-default port, if any
    pub port: Option<String>,
}

impl ParsedUrl {
    pub fn parse(url: &str) -> Result<Self, UrlError> {
        let url = url.trim();
        let caps = URL_PARTS
            .captures(url)
            .ok_or_else(|| UrlError::Invalid(url.to_string()))?;

        let scheme = caps["scheme"].to_ascii_lowercase();
        let host = caps
            .name("host")
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();

        if matches!(scheme.as_str(), "http" | "https") && host.is_empty() {
            return Err(UrlError::Invalid(url.to_string()));
        }

        let default_port = match scheme.as_str() {
            "http" => Some("80"),
            "https" => Some("443"),
            _ => None,
        };
        let port = caps
            .name("port")
            .map(|m| m.as_str())
            .filter(|p| !p.is_empty() && Some(*p) != default_port)
            .map(str::to_string);

        Ok(Self { scheme, host, port })
    }
}

fn rule(hit: bool) -> f64 {
    if hit {
        PHISHING
    } else {
        LEGITIMATE
    }
}

/// Extract the 30 website features, in `WEBSITE_LAYOUT` order
pub fn extract_website_features(url: &str) -> Result<Vec<f64>, UrlError> {
    let parsed = ParsedUrl::parse(url)?;
    let url = url.trim();
    let host = parsed.host.as_str();
    let length = url.chars().count();

    let url_length = if length < 54 {
        LEGITIMATE
    } else if length <= 75 {
        SUSPICIOUS
    } else {
        PHISHING
    };

    let labels = host.split('.').count();
    let sub_domain = match labels {
        0..=3 => LEGITIMATE,
        4 => SUSPICIOUS,
        _ => PHISHING,
    };

    let after_scheme: String = url.chars().skip(7).collect();
    let odd_tld = host.ends_with(".icu");
    let non_standard_port = parsed
        .port
        .as_deref()
        .is_some_and(|p| p != "80" && p != "443");

    let features = vec![
        rule(IPV4_LIKE.is_match(url)),                            // having_IP_Address
        url_length,                                               // URL_Length
        rule(SHORTENER.is_match(url)),                            // Shortining_Service
        rule(url.contains('@')),                                  // having_At_Symbol
        rule(after_scheme.contains("//")),                        // double_slash_redirecting
        rule(host.contains('-')),                                 // Prefix_Suffix
        sub_domain,                                               // having_Sub_Domain
        rule(parsed.scheme != "https"),                           // SSLfinal_State
        rule(odd_tld || host.ends_with(".xyz")),                  // Domain_registeration_length
        LEGITIMATE,                                               // Favicon
        rule(non_standard_port),                                  // port
        rule(host.contains("https")),                             // HTTPS_token
        LEGITIMATE,                                               // Request_URL
        LEGITIMATE,                                               // URL_of_Anchor
        LEGITIMATE,                                               // Links_in_tags
        LEGITIMATE,                                               // SFH
        rule(url.contains("mailto:")),                            // Submitting_to_email
        rule(ABNORMAL_WORDS.is_match(url)),                       // Abnormal_URL
        rule(REDIRECT_HINTS.is_match(url)),                       // Redirect
        LEGITIMATE,                                               // on_mouseover
        LEGITIMATE,                                               // RightClick
        LEGITIMATE,                                               // popUpWidnow
        LEGITIMATE,                                               // Iframe
        rule(odd_tld),                                            // age_of_domain
        rule(odd_tld),                                            // DNSRecord
        rule(!host.ends_with(".google.com")),                     // web_traffic
        LEGITIMATE,                                               // Page_Rank
        LEGITIMATE,                                               // Google_Index
        LEGITIMATE,                                               // Links_pointing_to_page
        rule(REPORTED_BRANDS.is_match(host)),                     // Statistical_report
    ];

    debug_assert_eq!(features.len(), WEBSITE_LAYOUT.len());
    Ok(features)
}

/// Extract and wrap as a `website_features` vector
pub fn website_vector(url: &str) -> Result<FeatureVector, UrlError> {
    let schema = FeatureSchema::website_features();
    Ok(FeatureVector::new(&schema, extract_website_features(url)?))
}
