//! Report generator tests against a local HTTP double

use chrono::NaiveDate;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use threatscribe::models::Event;
use threatscribe::report::{format_events, OllamaSummarizer, Summarizer, UNEXPECTED_RESPONSE_MSG};

fn summarizer_for(server: &MockServer) -> OllamaSummarizer {
    OllamaSummarizer::new(Url::parse(&server.uri()).unwrap(), "tinyllama".to_string())
}

fn sample_events() -> Vec<Event> {
    vec![Event {
        id: "42".to_string(),
        info: "Suspicious IP".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        tags: vec!["malware".to_string()],
    }]
}

#[tokio::test]
async fn completed_generation_returns_the_text() {
    let server = MockServer::start().await;

    // The prompt must embed both the IOC and the formatted event block
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "tinyllama", "stream": false })))
        .and(body_string_contains("1.2.3.4"))
        .and(body_string_contains("Event ID: 42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "tinyllama",
            "response": "This indicator is associated with malware distribution.",
            "done": true
        })))
        .mount(&server)
        .await;

    let formatted = format_events(&sample_events());
    let report = summarizer_for(&server).summarize("1.2.3.4", &formatted).await;

    assert_eq!(
        report,
        "This indicator is associated with malware distribution."
    );
}

#[tokio::test]
async fn missing_done_flag_yields_fixed_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "response": "partial text" })),
        )
        .mount(&server)
        .await;

    let report = summarizer_for(&server).summarize("1.2.3.4", "").await;
    assert_eq!(report, UNEXPECTED_RESPONSE_MSG);
}

#[tokio::test]
async fn incomplete_generation_yields_fixed_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "partial text", "done": false })),
        )
        .mount(&server)
        .await;

    let report = summarizer_for(&server).summarize("1.2.3.4", "").await;
    assert_eq!(report, UNEXPECTED_RESPONSE_MSG);
}

#[tokio::test]
async fn missing_payload_yields_fixed_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "done": true })))
        .mount(&server)
        .await;

    let report = summarizer_for(&server).summarize("1.2.3.4", "").await;
    assert_eq!(report, UNEXPECTED_RESPONSE_MSG);
}

#[tokio::test]
async fn service_error_becomes_a_diagnostic_string() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let report = summarizer_for(&server).summarize("1.2.3.4", "").await;
    assert!(report.starts_with("An error occurred while generating the report:"));
    assert!(report.contains("model not loaded"));
}

#[tokio::test]
async fn unreachable_service_becomes_a_diagnostic_string() {
    let summarizer = OllamaSummarizer::new(
        Url::parse("http://127.0.0.1:9").unwrap(),
        "tinyllama".to_string(),
    );

    let report = summarizer.summarize("1.2.3.4", "").await;
    assert!(report.starts_with("An error occurred while generating the report:"));
}
