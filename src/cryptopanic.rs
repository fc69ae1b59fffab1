// src/cryptopanic.rs
// CryptoPanic posts passthrough. The free API returns a paginated
// `{results: [...]}` envelope; each post is reshaped into a fixed
// `{votes, title, published_at, currencies}` record with absent fields
// defaulted rather than surfaced as nulls.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

fn default_kind() -> String {
    "news".to_string()
}
fn default_page() -> String {
    "1".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostsQuery {
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub currencies: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default = "default_page")]
    pub page: String,
}

// Upstream shapes: everything optional, defaults applied while reshaping.

#[derive(Debug, Deserialize)]
pub struct PostsEnvelope {
    #[serde(default)]
    pub results: Vec<RawPost>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub votes: RawVotes,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub currencies: Option<Vec<RawCurrency>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawVotes {
    #[serde(default)]
    pub negative: i64,
    #[serde(default)]
    pub positive: i64,
    #[serde(default)]
    pub important: i64,
}

#[derive(Debug, Deserialize)]
pub struct RawCurrency {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

// Output shapes.

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Post {
    pub votes: Votes,
    pub title: String,
    pub published_at: String,
    pub currencies: Vec<Currency>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Votes {
    pub negative: i64,
    pub positive: i64,
    pub important: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Currency {
    pub code: String,
    pub title: String,
}

/// GET one page of posts and reshape it. The caller has already verified
/// that an auth token is configured. Transport failure and non-2xx
/// surface as `Upstream`; a malformed body as `Decode`.
pub async fn fetch_posts(
    http: &reqwest::Client,
    base_url: &str,
    auth_token: &str,
    query: &PostsQuery,
) -> Result<Vec<Post>, AppError> {
    let url = format!("{base_url}/api/free/v1/posts/");
    let mut params: Vec<(&str, &str)> = vec![
        ("auth_token", auth_token),
        ("kind", &query.kind),
        ("page", &query.page),
    ];
    if let Some(currencies) = query.currencies.as_deref() {
        params.push(("currencies", currencies));
    }
    if let Some(filter) = query.filter.as_deref() {
        params.push(("filter", filter));
    }

    let resp = http
        .get(&url)
        .query(&params)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to fetch data from CryptoPanic: {e}")))?
        .error_for_status()
        .map_err(|e| AppError::Upstream(format!("Failed to fetch data from CryptoPanic: {e}")))?;

    let envelope: PostsEnvelope = resp
        .json()
        .await
        .map_err(|e| AppError::Decode(format!("Failed to decode CryptoPanic posts: {e}")))?;

    Ok(reshape_posts(envelope))
}

pub fn reshape_posts(envelope: PostsEnvelope) -> Vec<Post> {
    envelope
        .results
        .into_iter()
        .map(|raw| Post {
            votes: Votes {
                negative: raw.votes.negative,
                positive: raw.votes.positive,
                important: raw.votes.important,
            },
            title: raw.title.unwrap_or_default(),
            published_at: raw.published_at.unwrap_or_default(),
            currencies: raw
                .currencies
                .unwrap_or_default()
                .into_iter()
                .map(|c| Currency {
                    code: c.code.unwrap_or_default(),
                    title: c.title.unwrap_or_default(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_instead_of_failing() {
        let envelope: PostsEnvelope = serde_json::from_str(
            r#"{"results":[{"title":"BTC news"},{"votes":{"positive":3},"currencies":null}]}"#,
        )
        .unwrap();
        let posts = reshape_posts(envelope);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "BTC news");
        assert_eq!(posts[0].votes.positive, 0);
        assert!(posts[0].currencies.is_empty());
        assert_eq!(posts[1].votes.positive, 3);
        assert_eq!(posts[1].title, "");
        assert!(posts[1].currencies.is_empty());
    }

    #[test]
    fn currencies_are_projected_to_code_and_title() {
        let envelope: PostsEnvelope = serde_json::from_str(
            r#"{"results":[{"currencies":[{"code":"BTC","title":"Bitcoin","slug":"x"}]}]}"#,
        )
        .unwrap();
        let posts = reshape_posts(envelope);
        assert_eq!(
            posts[0].currencies,
            vec![Currency {
                code: "BTC".into(),
                title: "Bitcoin".into()
            }]
        );
    }
}
