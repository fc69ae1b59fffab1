// src/api.rs
// Router + handlers. Each endpoint is an independent path over shared,
// read-only state; failures are recovered at the boundary documented for
// that endpoint (per-source entries for /scrape, whole-request {error}
// with 500 for the passthroughs).

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::candles::{self, Candle, CandleQuery};
use crate::config::AppConfig;
use crate::cryptopanic::{self, Post, PostsQuery};
use crate::error::AppError;
use crate::scrape::extract::ArticleExtractor;
use crate::scrape::normalize::{process_outcome, ProcessedResult};
use crate::scrape::relevance::TopicClassifier;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub extractor: Arc<dyn ArticleExtractor>,
    pub classifier: Arc<dyn TopicClassifier>,
    pub http: reqwest::Client,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/scrape", post(scrape))
        .route("/candlestick", get(candlestick))
        .route("/cryptopanic", get(cryptopanic_posts))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize, Default)]
struct ScrapeReq {
    #[serde(default)]
    topic: Option<String>,
}

/// Crawl every configured source concurrently, then normalize outcomes
/// sequentially in source order. Always 200; failures ride along as
/// per-source `{source, error}` entries.
async fn scrape(
    State(state): State<AppState>,
    body: Option<Json<ScrapeReq>>,
) -> Json<Vec<ProcessedResult>> {
    let topic = body
        .map(|Json(b)| b)
        .unwrap_or_default()
        .topic
        .filter(|t| !t.trim().is_empty());

    let outcomes = crate::scrape::crawl_sources(
        Arc::clone(&state.extractor),
        &state.config.sources,
        Duration::from_secs(state.config.scrape_timeout_secs),
    )
    .await;

    let mut results = Vec::new();
    for outcome in outcomes {
        let entries = process_outcome(outcome, topic.as_deref(), state.classifier.as_ref()).await;
        results.extend(entries);
    }
    Json(results)
}

async fn candlestick(
    State(state): State<AppState>,
    Query(query): Query<CandleQuery>,
) -> Result<Json<Vec<Candle>>, AppError> {
    let candles =
        candles::fetch_candles(&state.http, &state.config.binance_base_url, &query).await?;
    Ok(Json(candles))
}

async fn cryptopanic_posts(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    // Credential check comes first; no external call without a token.
    let Some(token) = state.config.cryptopanic_auth_token.as_deref() else {
        return Err(AppError::Config(
            "CRYPTOPANIC_AUTH_TOKEN not set in environment variables".to_string(),
        ));
    };

    let posts = cryptopanic::fetch_posts(
        &state.http,
        &state.config.cryptopanic_base_url,
        token,
        &query,
    )
    .await?;
    Ok(Json(posts))
}
