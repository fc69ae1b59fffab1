// src/config.rs
// Process-wide configuration, read once at startup and passed explicitly.
// Nothing here is mutated after load.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

const ENV_SOURCES: &str = "SCRAPE_SOURCES";
const ENV_SOURCES_PATH: &str = "SCRAPE_SOURCES_PATH";
const DEFAULT_SOURCES_PATH: &str = "config/sources.toml";

/// Immutable application configuration.
///
/// Upstream base URLs are part of the config so tests can point the
/// passthrough endpoints at a local address instead of mutating the
/// environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_addr: SocketAddr,
    /// Credential for the extraction/classification chat API.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    /// Credential for the CryptoPanic posts API.
    pub cryptopanic_auth_token: Option<String>,
    /// Origin URLs crawled by `/scrape`, in response order.
    pub sources: Vec<String>,
    /// Upper bound on one source's fetch+extract, in seconds.
    pub scrape_timeout_secs: u64,
    pub binance_base_url: String,
    pub cryptopanic_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "https://api.openai.com".to_string(),
            cryptopanic_auth_token: None,
            sources: default_sources(),
            scrape_timeout_secs: 30,
            binance_base_url: "https://fapi.binance.com".to_string(),
            cryptopanic_base_url: "https://cryptopanic.com".to_string(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment.
    /// Missing credentials are not an error here; the endpoints that need
    /// them report the failure at request time.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let port = port
            .parse::<u16>()
            .with_context(|| format!("invalid PORT value '{port}'"))?;
        let ip = IpAddr::from_str(&host).with_context(|| format!("invalid HOST value '{host}'"))?;
        cfg.server_addr = SocketAddr::new(ip, port);

        cfg.openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty());
        cfg.cryptopanic_auth_token = env::var("CRYPTOPANIC_AUTH_TOKEN")
            .ok()
            .filter(|s| !s.is_empty());

        if let Ok(model) = env::var("OPENAI_MODEL") {
            cfg.openai_model = model;
        }
        if let Ok(secs) = env::var("SCRAPE_TIMEOUT_SECS") {
            cfg.scrape_timeout_secs = secs
                .parse::<u64>()
                .with_context(|| format!("invalid SCRAPE_TIMEOUT_SECS value '{secs}'"))?;
        }

        cfg.sources = load_sources_default()?;
        Ok(cfg)
    }
}

fn default_sources() -> Vec<String> {
    vec![
        "https://decrypt.co/news".to_string(),
        "https://cryptoslate.com/news/".to_string(),
    ]
}

/// Resolve the source list using env + fallbacks:
/// 1) $SCRAPE_SOURCES (comma-separated)
/// 2) $SCRAPE_SOURCES_PATH (TOML or JSON file)
/// 3) config/sources.toml
/// 4) built-in default list
fn load_sources_default() -> Result<Vec<String>> {
    if let Ok(inline) = env::var(ENV_SOURCES) {
        let list = parse_sources_csv(&inline);
        if !list.is_empty() {
            return Ok(list);
        }
    }
    if let Ok(p) = env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        }
        return Err(anyhow!("SCRAPE_SOURCES_PATH points to non-existent path"));
    }
    let default_p = PathBuf::from(DEFAULT_SOURCES_PATH);
    if default_p.exists() {
        return load_sources_from(&default_p);
    }
    Ok(default_sources())
}

/// Load the source list from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

pub fn parse_sources_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<String>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("sources");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    // Try JSON array
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported sources format"))
}

fn parse_toml(s: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct TomlSources {
        sources: Vec<String>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(clean_list(v.sources))
}

fn parse_json(s: &str) -> Result<Vec<String>> {
    let v: Vec<String> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|it| it.trim().to_string())
        .filter(|it| !it.is_empty())
        .collect()
}
