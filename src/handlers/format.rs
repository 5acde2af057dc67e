use anyhow::Result;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply, process};

/// Formats `format.md` in place with prettier.
pub struct FormatHandler {
    target: PathBuf,
}

impl FormatHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            target: data_dir.join("format.md"),
        }
    }
}

#[async_trait]
impl Handler for FormatHandler {
    fn name(&self) -> &str {
        "format"
    }

    fn description(&self) -> &str {
        "format format.md with prettier"
    }

    async fn run(&self) -> Result<TaskReply> {
        let args = [
            OsStr::new("prettier"),
            OsStr::new("--write"),
            self.target.as_os_str(),
        ];
        process::run("npx", args).await?;
        Ok(TaskReply::ok("File formatted"))
    }
}
