use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};
use crate::config;
use crate::consts::{API_TOKEN_ENV, DEFAULT_MODEL};
use crate::llm::ChatClient;

/// Asks a chat model for the sender address in `email.txt`.
pub struct EmailSenderHandler {
    input: PathBuf,
    output: PathBuf,
    api_url: Option<String>,
    model: String,
}

impl EmailSenderHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            input: data_dir.join("email.txt"),
            output: data_dir.join("email-sender.txt"),
            api_url: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Pin the endpoint instead of resolving it from the environment.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }
}

#[async_trait]
impl Handler for EmailSenderHandler {
    fn name(&self) -> &str {
        "extract-email"
    }

    fn description(&self) -> &str {
        "extract the sender address from email.txt via a chat model"
    }

    async fn run(&self) -> Result<TaskReply> {
        let token = config::require_env(API_TOKEN_ENV)?;
        let email = tokio::fs::read_to_string(&self.input)
            .await
            .with_context(|| format!("failed to read {}", self.input.display()))?;

        let url = self.api_url.clone().unwrap_or_else(config::llm_url);
        let client = ChatClient::new(url, &self.model, token);
        let sender = client
            .complete(&format!("Extract the sender's email: {email}"))
            .await?;

        tokio::fs::write(&self.output, sender)
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("Email extracted"))
    }
}
