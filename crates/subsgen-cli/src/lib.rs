//! SubsGen command-line front end.
//!
//! Each invocation of the `subsgen` binary is one load of the upload form.
//! The helpers here render form state and processing progress for a terminal.

pub mod form;
pub mod viewer;

use subsgen_api_client::{processing_steps, ProgressUpdate, StepStatus};
use subsgen_core::error::LogLevel;
use subsgen_core::AppError;

pub use form::{read_video_file, Submission, UploadForm};
pub use viewer::{save_result, SavedResult};

/// Shorten a file name to `max_chars` characters, ending it with "..." when cut.
pub fn truncate_filename(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        let kept: String = name.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn step_marker(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Completed => "[x]",
        StepStatus::Active => "[>]",
        StepStatus::Pending => "[ ]",
    }
}

/// One line of progress output: percentage, message, then the steps.
pub fn progress_line(update: &ProgressUpdate) -> String {
    let steps = processing_steps(update.percent)
        .iter()
        .map(|step| format!("{} {}", step_marker(step.status), step.label))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{:>3}% {:<24} {}", update.percent, update.message, steps)
}

/// Log an error at the level its kind calls for. Rejected input stays at
/// debug; configuration and I/O problems show up under the default filter.
pub fn log_error(error: &AppError) {
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, "Request rejected"),
        LogLevel::Warn => tracing::warn!(error = %error, "Error occurred"),
        LogLevel::Error => tracing::error!(error = %error, "Error occurred"),
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so they never mix with
/// command output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_filename_short() {
        assert_eq!(truncate_filename("talk.mp4", 20), "talk.mp4");
        assert_eq!(truncate_filename("", 5), "");
    }

    #[test]
    fn truncate_filename_exact() {
        assert_eq!(truncate_filename("talk.mp4", 8), "talk.mp4");
    }

    #[test]
    fn truncate_filename_long() {
        assert_eq!(truncate_filename("my_long_interview.mp4", 10), "my_long...");
        assert_eq!(truncate_filename("abc", 2), "...");
    }

    #[test]
    fn truncate_filename_counts_characters() {
        assert_eq!(truncate_filename("éééééé.mp4", 6), "ééé...");
    }

    #[test]
    fn progress_line_shows_steps() {
        let line = progress_line(&ProgressUpdate::started());
        assert!(line.starts_with(" 20% Extracting audio..."));
        assert!(line.contains("[x] Upload video"));
        assert!(line.contains("[>] Extract audio"));
        assert!(line.contains("[ ] Burn onto video"));
    }

    #[test]
    fn progress_line_when_complete() {
        let line = progress_line(&ProgressUpdate::complete());
        assert!(line.starts_with("100% Complete!"));
        assert!(!line.contains("[ ]"));
        assert!(!line.contains("[>]"));
    }
}
