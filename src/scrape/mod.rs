// src/scrape/mod.rs
// Fan-out/fan-in fetch dispatcher. All sources start together; the caller
// gets exactly one outcome per source, in configuration order, once every
// fetch has finished.

pub mod extract;
pub mod llm;
pub mod normalize;
pub mod relevance;

use std::sync::Arc;
use std::time::Duration;

use crate::scrape::extract::ArticleExtractor;

/// Success-with-content or failure-with-message, one per source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub source: String,
    pub result: Result<String, String>,
}

/// Fetch+extract every source concurrently.
///
/// `outcomes[i]` corresponds to `sources[i]` regardless of completion
/// order. One source's failure (extraction error, timeout, or task panic)
/// never aborts its siblings; it becomes that source's failure message.
pub async fn crawl_sources(
    extractor: Arc<dyn ArticleExtractor>,
    sources: &[String],
    timeout: Duration,
) -> Vec<FetchOutcome> {
    let mut handles = Vec::with_capacity(sources.len());
    for url in sources {
        let extractor = Arc::clone(&extractor);
        let url = url.clone();
        let handle =
            tokio::spawn(
                async move { tokio::time::timeout(timeout, extractor.extract(&url)).await },
            );
        handles.push(handle);
    }

    // Awaiting the handles in spawn order is the fan-in barrier; tasks keep
    // running concurrently while earlier ones are being joined.
    let mut outcomes = Vec::with_capacity(sources.len());
    for (source, handle) in sources.iter().cloned().zip(handles) {
        let result = match handle.await {
            Ok(Ok(Ok(content))) => Ok(content),
            Ok(Ok(Err(e))) => Err(format!("{e:#}")),
            Ok(Err(_elapsed)) => Err(format!("timed out after {}s", timeout.as_secs())),
            Err(e) => Err(format!("fetch task failed: {e}")),
        };
        if let Err(message) = &result {
            tracing::warn!(source = %source, error = %message, "source fetch failed");
        }
        outcomes.push(FetchOutcome { source, result });
    }
    outcomes
}
