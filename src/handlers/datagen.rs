use anyhow::Result;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::PathBuf;

use super::{Handler, TaskReply, process};
use crate::config;
use crate::consts::USER_EMAIL_ENV;

const DEFAULT_SCRIPT: &str = "datagen.py";

/// Installs `uv`, then runs the data generator for the configured user.
pub struct DatagenHandler {
    script: PathBuf,
}

impl Default for DatagenHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl DatagenHandler {
    pub fn new() -> Self {
        Self {
            script: PathBuf::from(DEFAULT_SCRIPT),
        }
    }

    pub fn with_script(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

#[async_trait]
impl Handler for DatagenHandler {
    fn name(&self) -> &str {
        "datagen"
    }

    fn description(&self) -> &str {
        "run datagen.py for $USER_EMAIL"
    }

    async fn run(&self) -> Result<TaskReply> {
        let email = config::require_env(USER_EMAIL_ENV)?;
        process::run("uv", ["pip", "install", "uv"]).await?;
        let args = [self.script.as_os_str(), OsStr::new(&email)];
        process::run("python3", args).await?;
        Ok(TaskReply::ok("Data generated"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_user_email_fails_before_spawning() {
        let handler = DatagenHandler::with_script("/nonexistent/datagen.py");
        let rt = tokio::runtime::Runtime::new().unwrap();
        let result = temp_env::with_var_unset(USER_EMAIL_ENV, || rt.block_on(handler.run()));
        let err = result.unwrap_err();
        assert!(err.to_string().contains(USER_EMAIL_ENV));
    }
}
