//! SubsGen Core Library
//!
//! This crate provides the domain models, the caption style catalog, upload
//! validation, error types, and configuration shared by the storage layer,
//! the processing client, and the command-line front end.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::AppError;
pub use models::{
    find_style, is_known_style, PendingSelection, RestoredSelection, StyleColors, SubtitleStyle,
    VideoPayload, SUBTITLE_STYLES,
};
pub use storage_types::StorageBackend;
pub use validation::{content_type_for_path, validate_video, validate_video_metadata};
