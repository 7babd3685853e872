//! Event formatting and report generation
//!
//! The formatter renders lookup results into the flat text block embedded
//! in the generation prompt. The summarizer submits that prompt to an
//! Ollama-compatible `/api/generate` endpoint and always yields displayable
//! text; generation failures are converted to diagnostic strings, never
//! propagated.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

use crate::models::{Event, IocType};

const GENERATE_PATH: &str = "api/generate";

/// Fixed message shown when the generation API answers with an unknown shape
pub const UNEXPECTED_RESPONSE_MSG: &str =
    "Unexpected response format. Please check the Ollama API.";

const SEPARATOR_WIDTH: usize = 20;

/// Render lookup events into a flat text block, one section per event.
///
/// Deterministic and order-preserving; each section ends with a dashed
/// separator line.
pub fn format_events(events: &[Event]) -> String {
    let mut out = String::new();

    for event in events {
        out.push_str(&format!("Event ID: {}\n", event.id));
        out.push_str(&format!("Event Info: {}\n", event.info));
        out.push_str(&format!("Date: {}\n", event.date));
        out.push_str(&format!("Tags: {}\n", event.tags.join(", ")));
        out.push_str(&"-".repeat(SEPARATOR_WIDTH));
        out.push('\n');
    }

    out
}

/// Build the generation prompt from the query and the formatted events
pub fn build_prompt(ioc: &str, formatted_events: &str) -> String {
    let kind = IocType::detect(ioc)
        .map(|t| format!(" (detected type: {t})"))
        .unwrap_or_default();

    format!(
        "Write a detailed security report for the following Indicator of Compromise (IOC): {ioc}{kind}\n\
         \n\
         The following is the search result from the MISP database:\n\
         {formatted_events}\n\
         Include possible risks, attack patterns, and suggestions for mitigation if any.\n"
    )
}

/// Summarize formatted lookup results into a report.
///
/// Implementations never fail; whatever happens, the returned string is
/// shown to the user in place of a report.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, ioc: &str, formatted_events: &str) -> String;
}

/// Completion object returned by the generation API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    done: Option<bool>,
}

/// Report generator backed by an Ollama-compatible `/api/generate` endpoint
pub struct OllamaSummarizer {
    client: Client,
    base_url: Url,
    model: String,
}

impl OllamaSummarizer {
    /// Create a new summarizer for the given endpoint and model.
    ///
    /// Generation on small local models can be slow, hence the generous
    /// timeout.
    pub fn new(base_url: Url, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            model,
        }
    }

    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, String> {
        let url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            GENERATE_PATH
        );

        let response = self
            .client
            .post(url)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await
            .map_err(|e| format!("request to the generation API failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("generation API returned status {status}: {body}"));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read the generation response: {e}"))?;

        tracing::debug!(body = %body, "Generation API response");

        serde_json::from_str(&body)
            .map_err(|e| format!("failed to decode the generation response: {e}"))
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, ioc: &str, formatted_events: &str) -> String {
        let prompt = build_prompt(ioc, formatted_events);

        match self.generate(&prompt).await {
            Ok(GenerateResponse {
                response: Some(text),
                done: Some(true),
            }) => text,
            Ok(other) => {
                tracing::warn!(?other, "Generation API answered with an unexpected shape");
                UNEXPECTED_RESPONSE_MSG.to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, "Report generation failed");
                format!("An error occurred while generating the report: {e}")
            }
        }
    }
}
