//! Result viewer: writes the captioned video to disk.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use subsgen_api_client::ProcessedVideo;

/// What was written, for the summary printed after processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResult {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

impl fmt::Display for SavedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Saved captioned video to {} ({:.2} MB",
            self.path.display(),
            self.size_bytes as f64 / (1024.0 * 1024.0)
        )?;
        if let Some(content_type) = &self.content_type {
            write!(f, ", {}", content_type)?;
        }
        write!(f, ")")
    }
}

pub async fn save_result(output: &Path, video: &ProcessedVideo) -> anyhow::Result<SavedResult> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    tokio::fs::write(output, &video.data)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        path = %output.display(),
        size_bytes = video.data.len(),
        "Wrote captioned video"
    );

    Ok(SavedResult {
        path: output.to_path_buf(),
        size_bytes: video.data.len() as u64,
        content_type: video.content_type.clone(),
    })
}
