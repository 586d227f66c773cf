#![warn(missing_docs)]
//! # kick-coach-app
//!
//! ## Purpose
//! Orchestrates file admission, analysis submission, and session state for
//! `kick-coach`.
//!
//! ## Responsibilities
//! - Own the session through [`WorkflowController`], the only writer of
//!   session state.
//! - Load configuration and build the HTTP analysis client.
//! - Load candidate files from disk for the command-line shell.
//! - Project session state into the read-only [`ViewState`].
//!
//! ## Data flow
//! File selection -> [`WorkflowController::prepare_attempt`] (validation,
//! request build) -> [`PendingAttempt::run`] (network exchange) ->
//! [`WorkflowController::apply_outcome`] -> [`project_view`] -> renderer.
//!
//! ## Ownership and lifetimes
//! The controller owns session state; consumers receive owned snapshots so
//! rendering never aliases controller internals.
//!
//! ## Error model
//! Validation and analysis failures are session states, not errors. Errors
//! are reserved for refused transitions ([`WorkflowError`]), configuration
//! ([`ConfigError`]), and local I/O ([`AppError`]).

mod config;
mod controller;

use std::path::Path;

pub use config::{
    AppConfig, ConfigError, DEFAULT_ENDPOINT, ENV_ENDPOINT, ENV_FORM_LAYOUT, ENV_TIMEOUT_SECS,
    parse_timeout,
};
pub use controller::{
    AttemptId, AttemptOutcome, Notification, PendingAttempt, Prepared, RETRY_MESSAGE,
    WorkflowController, WorkflowError,
};
use kick_coach_core::{CandidateFile, MAX_UPLOAD_BYTES};
use kick_coach_ui::ViewState;
use thiserror::Error;
use tokio::io::AsyncReadExt;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("KICK_COACH_VERSION");

/// Media type reported when content sniffing finds no match.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

const SNIFF_LEN: usize = 8 * 1024;

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Projects the controller's session into a render-ready view.
pub fn project_view(controller: &WorkflowController) -> ViewState {
    ViewState::project(&controller.snapshot())
}

/// Sniffs a media type from leading file bytes.
pub fn sniff_media_type(header: &[u8]) -> String {
    infer::get(header)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| UNKNOWN_MEDIA_TYPE.to_string())
}

/// Loads a candidate file from disk.
///
/// The media type is taken from `declared_media_type` when given, otherwise
/// sniffed from the file header. Files above the upload limit are not read in
/// full; they keep their real size and empty contents, which admission
/// rejects.
///
/// # Errors
/// Returns [`AppError::Io`] when the file cannot be opened or read.
pub async fn load_candidate(
    path: &Path,
    declared_media_type: Option<&str>,
) -> Result<CandidateFile, AppError> {
    let mut file = tokio::fs::File::open(path).await?;
    let size_bytes = file.metadata().await?.len();

    let oversized = size_bytes > MAX_UPLOAD_BYTES;
    let mut buffer = Vec::new();
    if oversized {
        (&mut file).take(SNIFF_LEN as u64).read_to_end(&mut buffer).await?;
    } else {
        buffer.reserve_exact(size_bytes as usize);
        file.read_to_end(&mut buffer).await?;
    }

    let media_type = match declared_media_type {
        Some(declared) => declared.to_string(),
        None => sniff_media_type(&buffer[..buffer.len().min(SNIFF_LEN)]),
    };

    let display_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if oversized {
        buffer = Vec::new();
    }

    Ok(CandidateFile {
        display_name,
        media_type,
        size_bytes,
        contents: buffer,
    })
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Local file access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
