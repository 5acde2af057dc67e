use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};

/// Keeps the `status == "active"` rows of `data.csv` as JSON objects.
pub struct FilterCsvHandler {
    input: PathBuf,
    output: PathBuf,
}

impl FilterCsvHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            input: data_dir.join("data.csv"),
            output: data_dir.join("filtered.json"),
        }
    }
}

/// Rows whose `column` equals `wanted`, keyed by header in column order.
pub fn filter_rows<R: Read>(reader: R, column: &str, wanted: &str) -> Result<Vec<Map<String, Value>>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), Value::String(v.to_string())))
            .collect();
        if row.get(column).and_then(Value::as_str) == Some(wanted) {
            rows.push(row);
        }
    }
    Ok(rows)
}

#[async_trait]
impl Handler for FilterCsvHandler {
    fn name(&self) -> &str {
        "filter-csv"
    }

    fn description(&self) -> &str {
        "write active rows of data.csv to filtered.json"
    }

    async fn run(&self) -> Result<TaskReply> {
        let input = self.input.clone();
        let rows = tokio::task::spawn_blocking(move || -> Result<_> {
            let file = std::fs::File::open(&input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            filter_rows(file, "status", "active")
        })
        .await??;
        tokio::fs::write(&self.output, serde_json::to_string_pretty(&rows)?)
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("CSV filtered"))
    }
}
