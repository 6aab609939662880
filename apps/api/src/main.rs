mod composer;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod pipeline;
mod portfolio;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tokio::sync::Mutex;

use crate::composer::EmailComposer;
use crate::config::Config;
use crate::extraction::{HttpPageLoader, JobExtractor};
use crate::llm_client::GroqClient;
use crate::pipeline::Pipeline;
use crate::portfolio::{load_portfolio, HttpEmbedder, PortfolioIndex};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first — missing credentials fail here, before any
    // pipeline stage can run.
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Outreach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the completion client
    let llm = Arc::new(
        GroqClient::new(config.groq_api_key.clone())
            .context("Failed to initialize completion client")?,
    );
    info!("Completion client initialized (model: {})", llm_client::MODEL);

    // Initialize the embedding client and portfolio index
    let embedder = Arc::new(
        HttpEmbedder::new(
            &config.embeddings_api_key,
            &config.embeddings_base_url,
            &config.embedding_model,
        )
        .context("Failed to initialize embedding client")?,
    );
    let index = Arc::new(PortfolioIndex::new(embedder));

    // Seed once from the portfolio CSV. A failure here is fatal — the
    // retrieval stage cannot run against an empty index.
    let corpus = load_portfolio(Path::new(&config.portfolio_csv_path))
        .context("Failed to load portfolio source")?;
    index
        .seed(corpus)
        .await
        .context("Failed to seed portfolio index")?;

    // Initialize the extraction and composition stages
    let loader = Arc::new(
        HttpPageLoader::new(&config.user_agent).context("Failed to initialize page loader")?,
    );
    let extractor = JobExtractor::new(loader, llm.clone());
    let composer = EmailComposer::new(llm);

    // Build app state around the single pipeline session
    let pipeline = Pipeline::new(extractor, index, composer);
    let state = AppState {
        pipeline: Arc::new(Mutex::new(pipeline)),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
