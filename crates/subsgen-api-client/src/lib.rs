//! HTTP client for the SubsGen processing service.
//!
//! The service takes a video and a caption style and answers with the
//! captioned video, or with a JSON error carrying a `detail` message. The
//! service reports no progress, so [`progress`] simulates it while the
//! request is in flight.

pub mod progress;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use subsgen_core::constants::PROCESS_ENDPOINT;
use subsgen_core::{Config, VideoPayload};
use thiserror::Error;
use tokio::sync::watch;

pub use progress::{processing_steps, ProcessingStep, ProgressUpdate, StepStatus};

const FALLBACK_ERROR_MESSAGE: &str = "Processing failed";

#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The service answered with a non-success status.
    #[error("{message} (status {status})")]
    Service { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProcessingError {
    /// Text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ProcessingError::Service { message, .. } => message.clone(),
            ProcessingError::Transport(e) => e.to_string(),
            ProcessingError::InvalidRequest(msg) => msg.clone(),
        }
    }
}

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// The captioned video returned by the service.
#[derive(Debug, Clone)]
pub struct ProcessedVideo {
    pub data: Bytes,
    pub content_type: Option<String>,
}

/// HTTP client for the processing service.
#[derive(Clone, Debug)]
pub struct ProcessingClient {
    client: Client,
    base_url: String,
}

impl ProcessingClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProcessingError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ProcessingError> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send the video and style, and return the captioned video.
    pub async fn process_video(
        &self,
        payload: &VideoPayload,
        style_id: &str,
    ) -> Result<ProcessedVideo, ProcessingError> {
        let video_part = Part::stream_with_length(
            reqwest::Body::from(payload.data.clone()),
            payload.size_bytes(),
        )
        .file_name(payload.filename.clone())
        .mime_str(&payload.content_type)
        .map_err(|e| {
            ProcessingError::InvalidRequest(format!(
                "Invalid content type {}: {}",
                payload.content_type, e
            ))
        })?;

        let form = Form::new()
            .part("video", video_part)
            .text("style", style_id.to_string());

        let url = self.build_url(PROCESS_ENDPOINT);
        let start = std::time::Instant::now();
        tracing::info!(
            url = %url,
            filename = %payload.filename,
            size_bytes = payload.size_bytes(),
            style_id = %style_id,
            "Submitting video for processing"
        );

        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());

            tracing::warn!(
                status = status.as_u16(),
                message = %message,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Processing request failed"
            );
            return Err(ProcessingError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let data = response.bytes().await?;

        tracing::info!(
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Processing complete"
        );

        Ok(ProcessedVideo { data, content_type })
    }

    /// Like [`process_video`](Self::process_video), publishing simulated
    /// progress on `progress` every `tick` until the request finishes.
    pub async fn process_with_progress(
        &self,
        payload: &VideoPayload,
        style_id: &str,
        progress: &watch::Sender<ProgressUpdate>,
        tick: Duration,
    ) -> Result<ProcessedVideo, ProcessingError> {
        progress.send_replace(ProgressUpdate::uploading());
        progress.send_replace(ProgressUpdate::started());

        let request = self.process_video(payload, style_id);
        tokio::pin!(request);

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);
        let mut simulating = true;

        let result = loop {
            tokio::select! {
                result = &mut request => break result,
                _ = ticker.tick(), if simulating => {
                    let current = *progress.borrow();
                    match current.next() {
                        Some(next) => {
                            progress.send_replace(next);
                        }
                        None => simulating = false,
                    }
                }
            }
        };

        if result.is_ok() {
            progress.send_replace(ProgressUpdate::complete());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client =
            ProcessingClient::new("http://localhost:7860/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:7860");
        assert_eq!(
            client.build_url(PROCESS_ENDPOINT),
            "http://localhost:7860/api/process"
        );
    }

    #[test]
    fn service_error_shows_detail() {
        let err = ProcessingError::Service {
            status: 422,
            message: "No speech detected".to_string(),
        };
        assert_eq!(err.user_message(), "No speech detected");
        assert_eq!(err.to_string(), "No speech detected (status 422)");
    }
}
