//! Upload form controller.
//!
//! Holds the selected video and caption style for one invocation and writes
//! every change through to the pending-selection store, so the next
//! invocation in the same session picks up where this one left off.

use std::path::Path;

use subsgen_core::constants::DEFAULT_STYLE_ID;
use subsgen_core::{
    content_type_for_path, is_known_style, validate_video, validate_video_metadata, AppError,
    VideoPayload,
};
use subsgen_storage::PendingSelectionStore;

/// What the form hands to the processing client on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub payload: VideoPayload,
    pub style_id: String,
}

/// Read a video from disk for [`UploadForm::select_file`].
///
/// Type and size are checked against the path and file metadata first, so a
/// file the form would reject is never loaded into memory.
pub async fn read_video_file(path: &Path, max_size_bytes: u64) -> Result<VideoPayload, AppError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = content_type_for_path(path);

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| read_error(path, e))?;
    if !metadata.is_file() {
        return Err(AppError::InvalidInput(format!(
            "{} is not a file",
            path.display()
        )));
    }
    validate_video_metadata(&filename, content_type, metadata.len(), max_size_bytes)?;

    let data = tokio::fs::read(path)
        .await
        .map_err(|e| read_error(path, e))?;
    Ok(VideoPayload::new(filename, content_type, data))
}

fn read_error(path: &Path, e: std::io::Error) -> AppError {
    match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::NotFound(format!("File not found: {}", path.display()))
        }
        _ => AppError::Internal(format!("Failed to read {}: {}", path.display(), e)),
    }
}

pub struct UploadForm {
    store: PendingSelectionStore,
    max_size_bytes: u64,
    file: Option<VideoPayload>,
    style_id: String,
    error: Option<String>,
    restored: bool,
}

impl UploadForm {
    pub fn new(store: PendingSelectionStore, max_size_bytes: u64) -> Self {
        Self {
            store,
            max_size_bytes,
            file: None,
            style_id: DEFAULT_STYLE_ID.to_string(),
            error: None,
            restored: false,
        }
    }

    /// Populate the form from the store, if a selection is pending.
    pub async fn mount(&mut self) {
        self.error = None;
        match self.store.get().await {
            Some(restored) => {
                let style_id = if is_known_style(&restored.style_id) {
                    restored.style_id
                } else {
                    tracing::warn!(
                        style_id = %restored.style_id,
                        "Restored selection has an unknown style, using the default"
                    );
                    DEFAULT_STYLE_ID.to_string()
                };
                tracing::info!(
                    filename = %restored.payload.filename,
                    style_id = %style_id,
                    "Restored pending selection"
                );
                self.file = Some(restored.payload);
                self.style_id = style_id;
                self.restored = true;
            }
            None => {
                self.file = None;
                self.style_id = DEFAULT_STYLE_ID.to_string();
                self.restored = false;
            }
        }
    }

    /// Validate and select a video. A rejected file leaves the previous
    /// selection in place and is not saved.
    pub async fn select_file(&mut self, payload: VideoPayload) -> Result<(), AppError> {
        if let Err(e) = validate_video(&payload, self.max_size_bytes) {
            self.error = Some(e.client_message());
            return Err(e);
        }

        self.error = None;
        self.restored = false;
        self.store.save(payload.clone(), &self.style_id).await;
        self.file = Some(payload);
        Ok(())
    }

    /// Change the caption style. Saved only when a file is selected.
    pub async fn select_style(&mut self, style_id: &str) -> Result<(), AppError> {
        if !is_known_style(style_id) {
            return Err(AppError::NotFound(format!("Unknown style: {}", style_id)));
        }

        self.style_id = style_id.to_string();
        if let Some(file) = &self.file {
            self.store.save(file.clone(), &self.style_id).await;
        }
        Ok(())
    }

    /// Drop the selection, both here and in the store.
    pub async fn discard(&mut self) {
        self.store.clear().await;
        self.file = None;
        self.error = None;
        self.restored = false;
    }

    /// Clear the pending selection and hand the file and style over for
    /// processing.
    pub async fn submit(&mut self) -> Result<Submission, AppError> {
        let payload = self.file.take().ok_or_else(|| {
            AppError::InvalidInput("Please select a video first".to_string())
        })?;

        self.store.clear().await;
        self.restored = false;
        self.error = None;

        Ok(Submission {
            payload,
            style_id: self.style_id.clone(),
        })
    }

    pub fn file(&self) -> Option<&VideoPayload> {
        self.file.as_ref()
    }

    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the current selection came from the store rather than from
    /// this invocation.
    pub fn is_restored(&self) -> bool {
        self.restored
    }
}
