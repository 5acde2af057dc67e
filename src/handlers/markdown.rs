use anyhow::{Context, Result};
use async_trait::async_trait;
use pulldown_cmark::{Parser, html};
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};

/// Renders `input.md` to `output.html`.
pub struct MarkdownHandler {
    input: PathBuf,
    output: PathBuf,
}

impl MarkdownHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            input: data_dir.join("input.md"),
            output: data_dir.join("output.html"),
        }
    }
}

pub fn render(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new(markdown));
    out
}

#[async_trait]
impl Handler for MarkdownHandler {
    fn name(&self) -> &str {
        "convert-markdown"
    }

    fn description(&self) -> &str {
        "render input.md to output.html"
    }

    async fn run(&self) -> Result<TaskReply> {
        let source = tokio::fs::read_to_string(&self.input)
            .await
            .with_context(|| format!("failed to read {}", self.input.display()))?;
        tokio::fs::write(&self.output, render(&source))
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("Markdown converted"))
    }
}
