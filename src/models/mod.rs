//! Core data models for IOC lookups

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Kinds of Indicators of Compromise the front-end recognizes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IocType {
    Ip,
    Domain,
    Url,
    Hash,
    Email,
    Cve,
}

impl std::fmt::Display for IocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IocType::Ip => write!(f, "ip"),
            IocType::Domain => write!(f, "domain"),
            IocType::Url => write!(f, "url"),
            IocType::Hash => write!(f, "hash"),
            IocType::Email => write!(f, "email"),
            IocType::Cve => write!(f, "cve"),
        }
    }
}

impl IocType {
    /// Classify a raw IOC value
    pub fn detect(value: &str) -> Option<IocType> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return None;
        }

        if trimmed.to_uppercase().starts_with("CVE-") {
            return Some(IocType::Cve);
        }

        // MD5 / SHA-1 / SHA-256 lengths
        if matches!(trimmed.len(), 32 | 40 | 64)
            && trimmed.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Some(IocType::Hash);
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Some(IocType::Url);
        }

        if trimmed.contains('@') && trimmed.contains('.') {
            return Some(IocType::Email);
        }

        if trimmed.parse::<std::net::IpAddr>().is_ok() {
            return Some(IocType::Ip);
        }

        if trimmed.contains('.')
            && !trimmed.contains(' ')
            && !trimmed.contains('/')
            && trimmed
                .chars()
                .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
        {
            return Some(IocType::Domain);
        }

        None
    }

    /// Case-fold a value for lookup based on its type
    pub fn normalize(&self, value: &str) -> String {
        let trimmed = value.trim();

        match self {
            IocType::Cve => trimmed.to_uppercase(),
            // URL paths can be case-sensitive; leave them alone
            IocType::Url => trimmed.to_string(),
            _ => trimmed.to_lowercase(),
        }
    }
}

/// A threat-intelligence event matching the queried IOC.
///
/// Immutable once fetched; lives for the duration of a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub info: String,
    pub date: NaiveDate,
    pub tags: Vec<String>,
}

/// Search form submitted from the front page
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchForm {
    #[validate(length(min = 1, message = "IOC must not be empty"))]
    pub ioc: String,
}
