mod config;
mod errors;
mod generation;
mod ingest;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::render::template::{validate_resume_template, DEFAULT_RESUME_TEMPLATE};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client. A missing key is not fatal: the server still renders
    // and downloads, and generation routes report the configuration error.
    let llm = match LlmClient::from_settings(&config.llm) {
        Ok(client) => {
            info!(
                "LLM client initialized (provider: {}, model: {})",
                client.provider(),
                client.model()
            );
            Some(client)
        }
        Err(e) => {
            error!("LLM client unavailable: {e}");
            None
        }
    };

    // Load and check the resume template before accepting requests
    let template = match &config.resume_template_path {
        Some(path) => {
            info!("Resume template: {}", path.display());
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read resume template {}", path.display()))?
        }
        None => {
            info!("Resume template: built-in");
            DEFAULT_RESUME_TEMPLATE.to_string()
        }
    };
    validate_resume_template(&template).context("Invalid resume template")?;

    if let Some(dir) = &config.export_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export dir {}", dir.display()))?;
        info!("Exporting generated documents to {}", dir.display());
    }

    let state = AppState::new(config.clone(), llm, template);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web front end has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
