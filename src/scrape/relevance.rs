// src/scrape/relevance.rs
// Topic relevance gate: one yes/no chat call per (article, topic) pair.
// No caching; identical pairs re-invoke the external call every time.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::config::AppConfig;
use crate::scrape::llm;
use crate::scrape::normalize::Article;

/// Prompt text is capped at the first 1000 characters of the
/// title/description/category concatenation.
const PROMPT_TEXT_CAP: usize = 1000;

const CLASSIFIER_SYSTEM: &str =
    "You are a helpful assistant that determines if text is related to a given topic.";

#[async_trait]
pub trait TopicClassifier: Send + Sync {
    async fn is_related(&self, article: &Article, topic: &str) -> Result<bool>;
}

pub struct OpenAiClassifier {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClassifier {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("crypto-news-gateway/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .context("building classifier http client")?;
        Ok(Self {
            http,
            api_key: config.openai_api_key.clone().unwrap_or_default(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
        })
    }
}

#[async_trait]
impl TopicClassifier for OpenAiClassifier {
    async fn is_related(&self, article: &Article, topic: &str) -> Result<bool> {
        if self.api_key.is_empty() {
            bail!("OPENAI_API_KEY not set in environment variables");
        }
        let prompt = relevance_prompt(article, topic);
        let reply = llm::chat_completion(
            &self.http,
            &self.base_url,
            &self.api_key,
            &self.model,
            CLASSIFIER_SYSTEM,
            &prompt,
        )
        .await?;
        Ok(interpret_reply(&reply))
    }
}

/// Build the binary yes/no question for one article.
pub fn relevance_prompt(article: &Article, topic: &str) -> String {
    let content = format!(
        "{}\n{}\n{}",
        article.title, article.short_description, article.category
    );
    let content: String = content.chars().take(PROMPT_TEXT_CAP).collect();
    format!(
        "Determine if the following text is related to the topic '{topic}'. \
         Respond with only 'Yes' or 'No'.\n\nText: {content}..."
    )
}

/// Relevant iff the trimmed, lower-cased reply is exactly "yes".
/// Partial matches and explanations count as not relevant; no retry.
pub fn interpret_reply(reply: &str) -> bool {
    reply.trim().to_lowercase() == "yes"
}
