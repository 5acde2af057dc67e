use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};

/// Counts the Wednesdays in `dates.txt`, one `YYYY-MM-DD` per line.
pub struct WednesdayHandler {
    input: PathBuf,
    output: PathBuf,
}

impl WednesdayHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            input: data_dir.join("dates.txt"),
            output: data_dir.join("dates-wednesdays.txt"),
        }
    }
}

/// Count lines of `text` falling on `weekday`. Blank lines are skipped.
pub fn count_weekday(text: &str, weekday: Weekday) -> Result<usize> {
    let mut count = 0;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let date = NaiveDate::parse_from_str(line, "%Y-%m-%d")
            .with_context(|| format!("invalid date: {line:?}"))?;
        if date.weekday() == weekday {
            count += 1;
        }
    }
    Ok(count)
}

#[async_trait]
impl Handler for WednesdayHandler {
    fn name(&self) -> &str {
        "count-wednesdays"
    }

    fn description(&self) -> &str {
        "count Wednesdays in dates.txt"
    }

    async fn run(&self) -> Result<TaskReply> {
        let text = tokio::fs::read_to_string(&self.input)
            .await
            .with_context(|| format!("failed to read {}", self.input.display()))?;
        let count = count_weekday(&text, Weekday::Wed)?;
        tokio::fs::write(&self.output, count.to_string())
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("Wednesdays counted"))
    }
}
