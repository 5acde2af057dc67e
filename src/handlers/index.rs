use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};

/// Maps every markdown file under `docs/` to its first H1 heading.
pub struct DocsIndexHandler {
    docs: PathBuf,
}

impl DocsIndexHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            docs: data_dir.join("docs"),
        }
    }
}

fn collect_markdown(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_markdown(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "md") {
            out.push(path);
        }
    }
    Ok(())
}

fn first_heading(path: &Path) -> Result<Option<String>> {
    let file = fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    for line in BufReader::new(file).lines() {
        if let Some(title) = line?.strip_prefix("# ") {
            return Ok(Some(title.trim().to_string()));
        }
    }
    Ok(None)
}

/// File name → title, for every `*.md` below `docs` that has a `# ` line.
///
/// Keys are bare file names, so same-named files in different folders
/// collapse into one entry.
pub fn build_index(docs: &Path) -> Result<BTreeMap<String, String>> {
    let mut files = Vec::new();
    collect_markdown(docs, &mut files)?;
    files.sort();

    let mut index = BTreeMap::new();
    for path in files {
        let Some(title) = first_heading(&path)? else {
            continue;
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        index.insert(name, title);
    }
    Ok(index)
}

#[async_trait]
impl Handler for DocsIndexHandler {
    fn name(&self) -> &str {
        "generate-index"
    }

    fn description(&self) -> &str {
        "index docs/**/*.md titles into docs/index.json"
    }

    async fn run(&self) -> Result<TaskReply> {
        let docs = self.docs.clone();
        let index = tokio::task::spawn_blocking(move || build_index(&docs)).await??;
        let output = self.docs.join("index.json");
        tokio::fs::write(&output, serde_json::to_string_pretty(&index)?)
            .await
            .with_context(|| format!("failed to write {}", output.display()))?;
        Ok(TaskReply::ok("Markdown index generated"))
    }
}
