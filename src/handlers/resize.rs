use anyhow::{Context, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};
use crate::consts::{RESIZE_HEIGHT, RESIZE_WIDTH};

/// Scales `image.png` to a fixed size, ignoring aspect ratio.
pub struct ResizeImageHandler {
    input: PathBuf,
    output: PathBuf,
}

impl ResizeImageHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            input: data_dir.join("image.png"),
            output: data_dir.join("image_resized.png"),
        }
    }
}

fn resize_file(input: &Path, output: &Path, width: u32, height: u32) -> Result<()> {
    let img = image::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    img.resize_exact(width, height, FilterType::Lanczos3)
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

#[async_trait]
impl Handler for ResizeImageHandler {
    fn name(&self) -> &str {
        "resize-image"
    }

    fn description(&self) -> &str {
        "resize image.png to 200x200"
    }

    async fn run(&self) -> Result<TaskReply> {
        let (input, output) = (self.input.clone(), self.output.clone());
        tokio::task::spawn_blocking(move || {
            resize_file(&input, &output, RESIZE_WIDTH, RESIZE_HEIGHT)
        })
        .await??;
        Ok(TaskReply::ok("Image resized"))
    }
}
