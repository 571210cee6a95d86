//! Shared constants.

use std::time::Duration;

/// Fixed key of the single pending-selection record.
pub const PENDING_SELECTION_KEY: &str = "current_video";

/// Name of the session-scoped marker that tells a reload from a fresh session.
pub const SESSION_MARKER_NAME: &str = "subsgen_session";

/// Default validity window of a pending selection (30 minutes).
pub const DEFAULT_EXPIRY_WINDOW: Duration = Duration::from_millis(30 * 60 * 1000);

/// Default maximum accepted video size in megabytes.
pub const DEFAULT_MAX_VIDEO_SIZE_MB: u64 = 100;

/// Media types accepted by the upload form.
pub const ALLOWED_VIDEO_CONTENT_TYPES: &[&str] = &[
    "video/mp4",
    "video/quicktime",
    "video/webm",
    "video/x-msvideo",
];

/// Style preselected when nothing has been restored.
pub const DEFAULT_STYLE_ID: &str = "hormozi";

/// Default file name for a downloaded result.
pub const DEFAULT_RESULT_FILENAME: &str = "subtitled_video.mp4";

/// Path of the processing endpoint on the remote service.
pub const PROCESS_ENDPOINT: &str = "/api/process";
