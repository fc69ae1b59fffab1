// src/scrape/normalize.rs
// Turn one source's fetch outcome into its slice of the response:
// zero or more projected articles, or exactly one `{source, error}` entry.

use serde::{Deserialize, Serialize};

use crate::scrape::relevance::TopicClassifier;
use crate::scrape::FetchOutcome;

/// One extracted article record, as produced by the extraction call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub short_description: String,
    pub category: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// One entry of the `/scrape` response. Serialized untagged, so items and
/// per-source errors mix in a single flat array.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ProcessedResult {
    Item {
        title: String,
        short_description: String,
        category: String,
        url: Option<String>,
    },
    SourceError {
        source: String,
        error: String,
    },
}

impl ProcessedResult {
    fn item(article: Article) -> Self {
        Self::Item {
            title: article.title,
            short_description: article.short_description,
            category: article.category,
            url: article.url,
        }
    }

    fn error(source: &str, error: impl Into<String>) -> Self {
        Self::SourceError {
            source: source.to_string(),
            error: error.into(),
        }
    }
}

/// Normalize one source's outcome.
///
/// Failure outcomes and undecodable content yield exactly one error entry.
/// A classifier failure mid-list keeps the items already emitted, appends
/// one error entry, and stops that source (fail-fast per source, never per
/// article). Classifier calls are sequential; articles keep their order.
pub async fn process_outcome(
    outcome: FetchOutcome,
    topic: Option<&str>,
    classifier: &dyn TopicClassifier,
) -> Vec<ProcessedResult> {
    let source = outcome.source;
    let content = match outcome.result {
        Ok(content) => content,
        Err(message) => return vec![ProcessedResult::error(&source, message)],
    };

    // Syntax first, shape second: a non-JSON payload and a JSON payload of
    // the wrong shape report differently.
    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(_) => return vec![ProcessedResult::error(&source, "Failed to parse JSON content")],
    };
    let articles: Vec<Article> = match serde_json::from_value(value) {
        Ok(a) => a,
        Err(e) => return vec![ProcessedResult::error(&source, e.to_string())],
    };

    let mut out = Vec::with_capacity(articles.len());
    for article in articles {
        if let Some(topic) = topic {
            match classifier.is_related(&article, topic).await {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    out.push(ProcessedResult::error(&source, format!("{e:#}")));
                    return out;
                }
            }
        }
        out.push(ProcessedResult::item(article));
    }
    out
}
