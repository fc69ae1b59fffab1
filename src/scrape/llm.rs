// src/scrape/llm.rs
// Thin chat-completions client shared by the extractor and the topic
// classifier. One request, one text reply; no retries.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: String,
}

/// Issue one chat-completion call and return the assistant reply verbatim.
pub async fn chat_completion(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    system: &str,
    user: &str,
) -> Result<String> {
    let req = ChatRequest {
        model,
        messages: vec![
            Msg {
                role: "system",
                content: system,
            },
            Msg {
                role: "user",
                content: user,
            },
        ],
        temperature: 0.2,
    };

    let resp = http
        .post(format!("{base_url}/v1/chat/completions"))
        .bearer_auth(api_key)
        .json(&req)
        .send()
        .await
        .context("chat completion request")?
        .error_for_status()
        .context("chat completion status")?;

    let body: ChatResponse = resp.json().await.context("chat completion body")?;
    let content = body
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| anyhow!("chat completion returned no choices"))?;
    Ok(content)
}
