use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{Handler, TaskReply};
use crate::consts::RECENT_LOG_LIMIT;

/// Collects the first line of the most recently modified `logs/*.log` files.
pub struct RecentLogsHandler {
    logs: PathBuf,
    output: PathBuf,
    limit: usize,
}

impl RecentLogsHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            logs: data_dir.join("logs"),
            output: data_dir.join("logs-recent.txt"),
            limit: RECENT_LOG_LIMIT,
        }
    }
}

/// `*.log` files directly inside `dir`, newest first, at most `limit`.
pub fn recent_logs(dir: &Path, limit: usize) -> Result<Vec<PathBuf>> {
    let mut logs: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "log") && entry.file_type()?.is_file() {
            logs.push((entry.metadata()?.modified()?, path));
        }
    }
    logs.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(logs.into_iter().take(limit).map(|(_, path)| path).collect())
}

fn first_line(path: &Path) -> Result<String> {
    let file = fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// First line of each recent log, one per line.
pub fn summarize(dir: &Path, limit: usize) -> Result<String> {
    let mut out = String::new();
    for path in recent_logs(dir, limit)? {
        out.push_str(&first_line(&path)?);
        out.push('\n');
    }
    Ok(out)
}

#[async_trait]
impl Handler for RecentLogsHandler {
    fn name(&self) -> &str {
        "extract-logs"
    }

    fn description(&self) -> &str {
        "first lines of the 10 newest logs/*.log into logs-recent.txt"
    }

    async fn run(&self) -> Result<TaskReply> {
        let (logs, limit) = (self.logs.clone(), self.limit);
        let summary = tokio::task::spawn_blocking(move || summarize(&logs, limit)).await??;
        tokio::fs::write(&self.output, summary)
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("Recent logs extracted"))
    }
}
