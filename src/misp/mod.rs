//! MISP lookup gateway
//!
//! Thin client for the MISP REST search API. The wire payload is validated
//! against a typed schema here, so the rest of the crate only ever sees
//! well-formed [`Event`] records.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::models::Event;

const REST_SEARCH_PATH: &str = "events/restSearch";

/// Errors surfaced by the lookup gateway
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("MISP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("MISP returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed MISP response: {0}")]
    Malformed(String),
}

/// Search a threat-intelligence source for events matching an IOC value
#[async_trait]
pub trait LookupGateway: Send + Sync {
    async fn search_value(&self, value: &str) -> Result<Vec<Event>, LookupError>;
}

/// MISP's restSearch controller wraps results in a `response` key, but some
/// proxies hand back the bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RestSearchBody {
    Wrapped { response: Vec<EventWrapper> },
    Bare(Vec<EventWrapper>),
}

#[derive(Debug, Deserialize)]
struct EventWrapper {
    #[serde(rename = "Event")]
    event: RawEvent,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: EventId,
    info: String,
    date: NaiveDate,
    #[serde(rename = "Tag", default)]
    tags: Vec<RawTag>,
}

/// MISP serializes event ids as strings; tolerate numbers as well
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventId {
    Text(String),
    Number(u64),
}

#[derive(Debug, Deserialize)]
struct RawTag {
    name: String,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        Event {
            id: match raw.id {
                EventId::Text(s) => s,
                EventId::Number(n) => n.to_string(),
            },
            info: raw.info,
            date: raw.date,
            tags: raw.tags.into_iter().map(|t| t.name).collect(),
        }
    }
}

/// MISP REST client implementing the lookup gateway
pub struct MispClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl MispClient {
    /// Create a new MISP client for the given instance
    pub fn new(base_url: Url, api_key: String, accept_invalid_certs: bool) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LookupGateway for MispClient {
    async fn search_value(&self, value: &str) -> Result<Vec<Event>, LookupError> {
        let url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            REST_SEARCH_PATH
        );

        let response = self
            .client
            .post(url)
            .header("Authorization", &self.api_key)
            .header("Accept", "application/json")
            .json(&json!({
                "value": value,
                "returnFormat": "json",
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status { status, body });
        }

        let body = response.text().await?;
        let parsed: RestSearchBody =
            serde_json::from_str(&body).map_err(|e| LookupError::Malformed(e.to_string()))?;

        let wrappers = match parsed {
            RestSearchBody::Wrapped { response } => response,
            RestSearchBody::Bare(events) => events,
        };

        tracing::debug!(value, events = wrappers.len(), "MISP search complete");

        Ok(wrappers.into_iter().map(|w| w.event.into()).collect())
    }
}
