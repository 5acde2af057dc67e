use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply, process};

/// Reads the card number off `credit-card.png` with tesseract.
pub struct CardNumberHandler {
    image: PathBuf,
    output: PathBuf,
}

impl CardNumberHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            image: data_dir.join("credit-card.png"),
            output: data_dir.join("credit-card.txt"),
        }
    }
}

/// Strip the spaces OCR leaves between digit groups.
pub fn normalize_card_number(ocr: &str) -> String {
    ocr.replace(' ', "").trim().to_string()
}

#[async_trait]
impl Handler for CardNumberHandler {
    fn name(&self) -> &str {
        "extract-card"
    }

    fn description(&self) -> &str {
        "OCR the card number from credit-card.png"
    }

    async fn run(&self) -> Result<TaskReply> {
        if !tokio::fs::try_exists(&self.image).await? {
            anyhow::bail!("{} not found", self.image.display());
        }
        let args = [self.image.as_os_str(), OsStr::new("stdout")];
        let text = process::run("tesseract", args).await?;
        tokio::fs::write(&self.output, normalize_card_number(&text))
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("Card number extracted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_spaces_and_newlines() {
        assert_eq!(
            normalize_card_number("4111 1111 1111 1111\n\n"),
            "4111111111111111"
        );
    }

    #[test]
    fn empty_ocr_output() {
        assert_eq!(normalize_card_number("  \n"), "");
    }
}
