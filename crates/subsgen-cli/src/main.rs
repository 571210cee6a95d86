//! SubsGen CLI: pick a talking-head video and a caption style, then send both
//! to the processing service.
//!
//! The pending selection survives between invocations in the same terminal
//! session for up to 30 minutes. Set SUBSGEN_API_URL (or API_URL) to point at
//! the service.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use subsgen_api_client::{ProcessingClient, ProgressUpdate};
use subsgen_cli::{
    init_tracing, log_error, progress_line, read_video_file, save_result, truncate_filename,
    UploadForm,
};
use subsgen_core::constants::DEFAULT_RESULT_FILENAME;
use subsgen_core::{AppError, Config, SUBTITLE_STYLES};
use subsgen_storage::{create_session_scope, create_store, SessionTracker};
use tokio::sync::watch;

const FILENAME_DISPLAY_CHARS: usize = 48;

#[derive(Parser)]
#[command(name = "subsgen", about = "Add animated subtitles to talking-head videos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available caption styles
    Styles {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Select a video (MP4, MOV, WebM, or AVI) for captioning
    Select {
        /// Path to the video file
        file: PathBuf,
        /// Caption style ID
        #[arg(long)]
        style: Option<String>,
    },
    /// Change the caption style of the pending video
    Style {
        /// Caption style ID
        id: String,
    },
    /// Show the pending video, if any
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Discard the pending video
    Discard,
    /// Send the pending video for captioning and save the result
    Submit {
        /// Where to write the captioned video
        #[arg(long, default_value = DEFAULT_RESULT_FILENAME)]
        output: PathBuf,
    },
}

#[derive(Serialize)]
struct StatusReport<'a> {
    pending: bool,
    restored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    style_id: &'a str,
}

/// Form errors are logged in full and shown with their user-facing message.
fn user_error(e: AppError) -> anyhow::Error {
    log_error(&e);
    anyhow::anyhow!(e.client_message())
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env()
        .inspect_err(|e| {
            if let Some(app_error) = e.downcast_ref::<AppError>() {
                log_error(app_error);
            }
        })
        .context("Failed to load configuration")?;

    let store = create_store(&config);
    let mut tracker = SessionTracker::new(create_session_scope(&config), store.clone());
    tracker.on_load().await;

    let mut form = UploadForm::new(store, config.max_video_size_bytes);
    form.mount().await;

    let result = run(cli.command, &config, &mut form).await;

    tracker.on_teardown().await;
    result
}

async fn run(command: Commands, config: &Config, form: &mut UploadForm) -> anyhow::Result<()> {
    match command {
        Commands::Styles { json } => {
            if json {
                print_json(&SUBTITLE_STYLES)?;
            } else {
                for style in SUBTITLE_STYLES.iter() {
                    let marker = if style.id == form.style_id() { "*" } else { " " };
                    println!(
                        "{} {:<8} {:<13} {:<24} {}",
                        marker, style.id, style.name, style.description, style.preview
                    );
                }
            }
        }
        Commands::Select { file, style } => {
            if let Some(style) = style {
                form.select_style(&style).await.map_err(user_error)?;
            }

            let payload = read_video_file(&file, config.max_video_size_bytes)
                .await
                .map_err(user_error)?;
            form.select_file(payload).await.map_err(user_error)?;

            if let Some(selected) = form.file() {
                println!(
                    "Selected {} ({}) with style {}",
                    truncate_filename(&selected.filename, FILENAME_DISPLAY_CHARS),
                    selected.size_mb_display(),
                    form.style_id()
                );
                println!(
                    "Run `subsgen submit` within {} minutes to process it.",
                    config.expiry_window.as_secs() / 60
                );
            }
        }
        Commands::Style { id } => {
            form.select_style(&id).await.map_err(user_error)?;
            println!("Style set to {}", id);
            if form.file().is_none() {
                println!("No video is pending. Run `subsgen select` to pick one.");
            }
        }
        Commands::Status { json } => {
            let file = form.file();
            let report = StatusReport {
                pending: file.is_some(),
                restored: form.is_restored(),
                filename: file.map(|f| f.filename.as_str()),
                content_type: file.map(|f| f.content_type.as_str()),
                size_bytes: file.map(|f| f.size_bytes()),
                style_id: form.style_id(),
            };
            if json {
                print_json(&report)?;
            } else {
                match file {
                    Some(file) => println!(
                        "Pending: {} ({}), style {}",
                        truncate_filename(&file.filename, FILENAME_DISPLAY_CHARS),
                        file.size_mb_display(),
                        form.style_id()
                    ),
                    None => println!("No video pending"),
                }
            }
        }
        Commands::Discard => {
            form.discard().await;
            println!("Pending video discarded");
        }
        Commands::Submit { output } => {
            let client = ProcessingClient::from_config(config)
                .context("Failed to create processing client")?;
            let submission = form.submit().await.map_err(user_error)?;

            let (tx, mut rx) = watch::channel(ProgressUpdate::idle());
            let render = tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let update = *rx.borrow_and_update();
                    if !update.message.is_empty() {
                        eprintln!("{}", progress_line(&update));
                    }
                }
            });

            let processed = client
                .process_with_progress(
                    &submission.payload,
                    &submission.style_id,
                    &tx,
                    config.progress_tick,
                )
                .await;
            drop(tx);
            render.await.ok();

            let processed = processed.map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let saved = save_result(&output, &processed).await?;
            println!("{}", saved);
        }
    }

    Ok(())
}
