//! Upload validation

use std::path::Path;

use crate::constants::ALLOWED_VIDEO_CONTENT_TYPES;
use crate::error::AppError;
use crate::models::VideoPayload;

pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Please upload a video file (MP4, MOV, WebM, or AVI)";

/// Check the media type first, then the size.
pub fn validate_video(payload: &VideoPayload, max_size_bytes: u64) -> Result<(), AppError> {
    validate_video_metadata(
        &payload.filename,
        &payload.content_type,
        payload.size_bytes(),
        max_size_bytes,
    )
}

/// Same checks as [`validate_video`] on a file's name, type and size alone,
/// before any of its content is read.
pub fn validate_video_metadata(
    filename: &str,
    content_type: &str,
    size_bytes: u64,
    max_size_bytes: u64,
) -> Result<(), AppError> {
    let normalized = content_type.to_lowercase();
    if !ALLOWED_VIDEO_CONTENT_TYPES
        .iter()
        .any(|allowed| normalized == *allowed)
    {
        tracing::debug!(
            filename = %filename,
            content_type = %content_type,
            "Rejected file with unsupported content type"
        );
        return Err(AppError::UnsupportedMediaType(
            UNSUPPORTED_TYPE_MESSAGE.to_string(),
        ));
    }

    if size_bytes > max_size_bytes {
        tracing::debug!(
            filename = %filename,
            size_bytes,
            max_size_bytes,
            "Rejected file over the size limit"
        );
        return Err(AppError::PayloadTooLarge(format!(
            "File size must be under {}MB",
            max_size_bytes / (1024 * 1024)
        )));
    }

    Ok(())
}

/// Media type for a file on disk, derived from its extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" | "qt" => "video/quicktime",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}
