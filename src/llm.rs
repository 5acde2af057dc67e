//! Minimal chat-completion client (OpenAI-compatible wire format).

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One-shot chat completion against a fixed endpoint.
pub struct ChatClient {
    url: String,
    model: String,
    token: String,
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(url: impl Into<String>, model: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            token: token.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Send `prompt` as a single user message and return the reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ApiRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("chat API error ({}): {}", status, text);
        }

        let api_resp: ApiResponse = resp.json().await?;
        if let Some(usage) = &api_resp.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }
        Self::reply_text(api_resp)
    }

    fn reply_text(resp: ApiResponse) -> Result<String> {
        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let text = text.trim();
        if text.is_empty() {
            bail!("chat API returned empty response");
        }
        Ok(text.to_string())
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
