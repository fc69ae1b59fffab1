// src/scrape/extract.rs
// Fetch one source page and delegate structured article extraction to the
// chat API. The dispatcher never parses HTML itself; the page is reduced
// to plain text here only to keep the prompt within bounds.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;

use crate::config::AppConfig;
use crate::scrape::llm;

/// Cap on the page text handed to the extraction prompt, in characters.
const PAGE_TEXT_CAP: usize = 12_000;

const EXTRACTION_SYSTEM: &str =
    "You are a precise extraction engine. You output only valid JSON, with no surrounding prose.";

const EXTRACTION_INSTRUCTION: &str = r#"From the crawled content, extract all articles presented on the page. For each article, extract:

1. Title of the article.
2. Short description or summary of the article.
3. Category or topic of the article.
4. URL of the article.

Return a JSON array where each element has the fields `title`, `short_description`, `category` and `url`. Return only the JSON array."#;

/// Seam between the dispatcher and the external fetch+extract capability.
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    /// Fetch `url` and return the extracted content — expected to be a
    /// JSON array of article records, but returned as raw text; decoding
    /// is the normalizer's job.
    async fn extract(&self, url: &str) -> Result<String>;
}

/// Production extractor: reqwest page fetch + one chat-completion call.
pub struct LlmExtractor {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmExtractor {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("crypto-news-gateway/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .context("building extractor http client")?;
        Ok(Self {
            http,
            api_key: config.openai_api_key.clone().unwrap_or_default(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
        })
    }
}

#[async_trait]
impl ArticleExtractor for LlmExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("OPENAI_API_KEY not set in environment variables");
        }

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?
            .error_for_status()
            .with_context(|| format!("fetching {url}"))?;
        let html = resp.text().await.with_context(|| format!("reading {url}"))?;

        let mut text = page_to_text(&html);
        if text.chars().count() > PAGE_TEXT_CAP {
            text = text.chars().take(PAGE_TEXT_CAP).collect();
        }
        if text.is_empty() {
            bail!("page at {url} produced no extractable text");
        }

        let user = format!("{EXTRACTION_INSTRUCTION}\n\nCrawled content:\n{text}");
        let reply = llm::chat_completion(
            &self.http,
            &self.base_url,
            &self.api_key,
            &self.model,
            EXTRACTION_SYSTEM,
            &user,
        )
        .await?;

        Ok(strip_code_fences(&reply).to_string())
    }
}

/// Reduce an HTML page to plain text: drop script/style blocks, strip
/// tags, decode entities, collapse whitespace.
pub fn page_to_text(html: &str) -> String {
    static RE_BLOCKS: OnceCell<regex::Regex> = OnceCell::new();
    let re_blocks = RE_BLOCKS.get_or_init(|| {
        regex::Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>")
            .unwrap()
    });
    let mut out = re_blocks.replace_all(html, " ").to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    out = html_escape::decode_html_entities(&out).to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Models often wrap JSON replies in ``` fences; unwrap when present.
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
