//! Crypto News Gateway — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crypto_news_gateway::api::{self, AppState};
use crypto_news_gateway::config::AppConfig;
use crypto_news_gateway::scrape::extract::LlmExtractor;
use crypto_news_gateway::scrape::relevance::OpenAiClassifier;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crypto_news_gateway=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Arc::new(AppConfig::from_env()?);
    let addr = config.server_addr;

    let extractor = Arc::new(LlmExtractor::new(&config)?);
    let classifier = Arc::new(OpenAiClassifier::new(&config)?);

    let state = AppState {
        config,
        extractor,
        classifier,
        http: reqwest::Client::new(),
    };
    let router = api::router(state);

    tracing::info!(%addr, "listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
