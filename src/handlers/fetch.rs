use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};
use crate::consts::POSTS_URL;

/// Downloads a JSON document and stores it pretty-printed in `api_data.json`.
pub struct FetchApiHandler {
    url: String,
    output: PathBuf,
}

impl FetchApiHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            url: POSTS_URL.to_string(),
            output: data_dir.join("api_data.json"),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl Handler for FetchApiHandler {
    fn name(&self) -> &str {
        "fetch-api"
    }

    fn description(&self) -> &str {
        "download the posts API into api_data.json"
    }

    async fn run(&self) -> Result<TaskReply> {
        let data: serde_json::Value = reqwest::get(&self.url)
            .await
            .with_context(|| format!("failed to fetch {}", self.url))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("{} did not return JSON", self.url))?;
        tokio::fs::write(&self.output, serde_json::to_string_pretty(&data)?)
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("API data fetched"))
    }
}
