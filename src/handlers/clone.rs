use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{Handler, TaskReply, process};
use crate::consts::REPO_URL;

/// Clones the reference repository into `<data>/repo`.
pub struct CloneRepoHandler {
    url: String,
    data_dir: PathBuf,
    target: PathBuf,
}

impl CloneRepoHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            url: REPO_URL.to_string(),
            data_dir: data_dir.to_path_buf(),
            target: data_dir.join("repo"),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Move `staged` to `target`, replacing whatever was there.
async fn swap_into_place(staged: &Path, target: &Path) -> Result<()> {
    if tokio::fs::try_exists(target).await? {
        info!(path = %target.display(), "replacing previous clone");
        tokio::fs::remove_dir_all(target)
            .await
            .with_context(|| format!("failed to remove {}", target.display()))?;
    }
    tokio::fs::rename(staged, target)
        .await
        .with_context(|| format!("failed to move clone into {}", target.display()))?;
    Ok(())
}

#[async_trait]
impl Handler for CloneRepoHandler {
    fn name(&self) -> &str {
        "clone-repo"
    }

    fn description(&self) -> &str {
        "git clone the reference repository into repo/"
    }

    async fn run(&self) -> Result<TaskReply> {
        // Stage next to the target so the final rename stays on one filesystem.
        let scratch = tempfile::Builder::new()
            .prefix(".repo-")
            .tempdir_in(&self.data_dir)
            .with_context(|| format!("failed to stage clone in {}", self.data_dir.display()))?;
        let staged = scratch.path().join("repo");
        let args = [OsStr::new("clone"), OsStr::new(&self.url), staged.as_os_str()];
        process::run("git", args).await?;

        swap_into_place(&staged, &self.target).await?;
        Ok(TaskReply::ok("Git repo cloned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".repo-"))
            .collect()
    }

    #[tokio::test]
    async fn failed_clone_keeps_previous_checkout() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("repo")).unwrap();
        fs::write(dir.path().join("repo/README"), "old").unwrap();

        let handler = CloneRepoHandler::new(dir.path()).with_url("/nonexistent/repo.git");
        assert!(handler.run().await.is_err());

        assert_eq!(fs::read_to_string(dir.path().join("repo/README")).unwrap(), "old");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn swap_replaces_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged");
        let target = dir.path().join("repo");
        fs::create_dir_all(&staged).unwrap();
        fs::write(staged.join("README"), "new").unwrap();
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("stale"), "old").unwrap();

        swap_into_place(&staged, &target).await.unwrap();

        assert_eq!(fs::read_to_string(target.join("README")).unwrap(), "new");
        assert!(!target.join("stale").exists());
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn swap_into_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged");
        fs::create_dir_all(&staged).unwrap();

        swap_into_place(&staged, &dir.path().join("repo")).await.unwrap();
        assert!(dir.path().join("repo").is_dir());
    }
}
