use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply, process};

const WHISPER_MODEL: &str = "base";

/// Transcribes `audio.mp3` with the whisper CLI.
pub struct TranscribeHandler {
    audio: PathBuf,
    output: PathBuf,
}

impl TranscribeHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            audio: data_dir.join("audio.mp3"),
            output: data_dir.join("audio-transcript.txt"),
        }
    }
}

#[async_trait]
impl Handler for TranscribeHandler {
    fn name(&self) -> &str {
        "transcribe-audio"
    }

    fn description(&self) -> &str {
        "transcribe audio.mp3 to audio-transcript.txt"
    }

    async fn run(&self) -> Result<TaskReply> {
        if !tokio::fs::try_exists(&self.audio).await? {
            anyhow::bail!("{} not found", self.audio.display());
        }

        // whisper names its output after the input stem. The scratch dir is
        // removed on drop.
        let scratch = tempfile::tempdir()?;
        let args = [
            self.audio.as_os_str(),
            OsStr::new("--model"),
            OsStr::new(WHISPER_MODEL),
            OsStr::new("--output_format"),
            OsStr::new("txt"),
            OsStr::new("--output_dir"),
            scratch.path().as_os_str(),
        ];
        process::run("whisper", args).await?;

        let stem = self
            .audio
            .file_stem()
            .context("audio path has no file name")?;
        let produced = scratch.path().join(stem).with_extension("txt");
        let transcript = tokio::fs::read_to_string(&produced)
            .await
            .with_context(|| format!("whisper produced no transcript at {}", produced.display()))?;

        tokio::fs::write(&self.output, transcript.trim())
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("Audio transcribed"))
    }
}
