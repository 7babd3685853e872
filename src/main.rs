//! ThreatScribe
//!
//! Look up an IOC in a MISP instance and draft a security report with a
//! locally hosted language model.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use threatscribe::misp::MispClient;
use threatscribe::report::OllamaSummarizer;
use threatscribe::web::{create_router, AppState};

/// ThreatScribe
#[derive(Parser, Debug)]
#[command(name = "threatscribe")]
#[command(about = "Look up IOCs in MISP and draft security reports with a local LLM")]
struct Args {
    /// Server host
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    /// MISP instance base URL
    #[arg(long, env = "MISP_URL")]
    misp_url: String,

    /// MISP API key
    #[arg(long, env = "MISP_API_KEY")]
    misp_api_key: String,

    /// Accept invalid TLS certificates from the MISP instance
    #[arg(long, env = "MISP_INSECURE", default_value = "false")]
    misp_insecure: bool,

    /// Base URL of the Ollama-compatible generation API
    #[arg(long, env = "OLLAMA_URL", default_value = "http://127.0.0.1:11434")]
    ollama_url: String,

    /// Model used for report generation
    #[arg(long, env = "OLLAMA_MODEL", default_value = "tinyllama")]
    ollama_model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "threatscribe=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse arguments
    let args = Args::parse();

    tracing::info!("Starting ThreatScribe");

    let misp_url = Url::parse(&args.misp_url).context("Invalid MISP base URL")?;
    let ollama_url = Url::parse(&args.ollama_url).context("Invalid Ollama base URL")?;

    if args.misp_insecure {
        tracing::warn!("TLS certificate verification for MISP is disabled");
    }

    let lookup = MispClient::new(misp_url, args.misp_api_key, args.misp_insecure);
    let summarizer = OllamaSummarizer::new(ollama_url, args.ollama_model.clone());
    tracing::info!(model = %args.ollama_model, "Report generation enabled");

    // Create application state
    let state = Arc::new(AppState {
        lookup: Arc::new(lookup),
        summarizer: Arc::new(summarizer),
    });

    // Setup CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Create router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
