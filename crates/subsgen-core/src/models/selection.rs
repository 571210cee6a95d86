//! Pending selection model: the video a user picked but has not submitted yet.

use bytes::Bytes;
use std::fmt;

use crate::constants::PENDING_SELECTION_KEY;

/// Raw video content with the name and media type it was selected with.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoPayload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl VideoPayload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Size in megabytes with two decimals, as shown next to the file name.
    pub fn size_mb_display(&self) -> String {
        format!("{:.2} MB", self.data.len() as f64 / (1024.0 * 1024.0))
    }

    /// A payload without a name or content cannot be restored.
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty() && self.data.is_empty()
    }
}

impl fmt::Debug for VideoPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoPayload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.data.len())
            .finish()
    }
}

/// The single persisted record. A later save replaces it entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    pub id: String,
    pub payload: VideoPayload,
    pub style_id: String,
    pub saved_at_ms: i64,
}

impl PendingSelection {
    pub fn new(payload: VideoPayload, style_id: impl Into<String>, saved_at_ms: i64) -> Self {
        Self {
            id: PENDING_SELECTION_KEY.to_string(),
            payload,
            style_id: style_id.into(),
            saved_at_ms,
        }
    }

    /// Milliseconds elapsed since the record was saved. Negative if the clock went backwards.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.saved_at_ms
    }

    pub fn is_expired(&self, now_ms: i64, expiry_ms: i64) -> bool {
        self.age_ms(now_ms) >= expiry_ms
    }

    pub fn into_restored(self) -> RestoredSelection {
        RestoredSelection {
            payload: self.payload,
            style_id: self.style_id,
        }
    }
}

/// What a successful restore hands back to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredSelection {
    pub payload: VideoPayload,
    pub style_id: String,
}
