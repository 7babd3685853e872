//! Web front-end: search form, lookup, report rendering

pub mod views;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

use crate::misp::{LookupError, LookupGateway};
use crate::models::{IocType, SearchForm};
use crate::report::{format_events, Summarizer};

/// Application state shared across handlers.
///
/// Both collaborators are constructed once at startup and injected here;
/// handlers never reach for globals.
pub struct AppState {
    pub lookup: Arc<dyn LookupGateway>,
    pub summarizer: Arc<dyn Summarizer>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", post(search))
        .route("/health", get(health_check))
        .with_state(state)
}

// ==================== Handlers ====================

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "threatscribe",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn index() -> Html<String> {
    Html(views::index_page())
}

async fn search(State(state): State<Arc<AppState>>, Form(form): Form<SearchForm>) -> Response {
    let ioc = form.ioc.trim().to_string();

    if form.validate().is_err() || ioc.is_empty() {
        return (StatusCode::BAD_REQUEST, "IOC must not be empty".to_string()).into_response();
    }

    // Normalize before the lookup; the user's spelling is what gets echoed
    let query = match IocType::detect(&ioc) {
        Some(t) => t.normalize(&ioc),
        None => ioc.clone(),
    };

    match state.lookup.search_value(&query).await {
        Ok(events) if events.is_empty() => {
            tracing::info!(ioc = %ioc, "No matching events");
            Html(views::results_page(&ioc, None, None)).into_response()
        }
        Ok(events) => {
            tracing::info!(ioc = %ioc, events = events.len(), "Matching events found");
            let formatted = format_events(&events);
            let report = state.summarizer.summarize(&ioc, &formatted).await;
            Html(views::results_page(&ioc, Some(&events), Some(&report))).into_response()
        }
        Err(e) => {
            tracing::error!(error = ?e, ioc = %ioc, "IOC lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An error occurred: {}", error_chain(&e)),
            )
                .into_response()
        }
    }
}

/// Render a lookup error and its source chain into a plain-text body
fn error_chain(err: &LookupError) -> String {
    let mut out = err.to_string();
    let mut source = std::error::Error::source(err);

    while let Some(cause) = source {
        out.push_str(&format!("\ncaused by: {cause}"));
        source = cause.source();
    }

    out
}
