#![warn(missing_docs)]
//! # kick-coach-ui
//!
//! ## Purpose
//! Defines the read-only view model consumed by the score gauge,
//! recommendation list, and video surface.
//!
//! ## Responsibilities
//! - Project a [`SessionSnapshot`] into display-ready values.
//! - Mirror the workflow state machine in the file picker gate (disabled
//!   while an attempt is in flight).
//! - Offer an optional playback observer for surface instrumentation.
//!
//! ## Data flow
//! Workflow controller -> [`SessionSnapshot`] -> [`ViewState::project`] ->
//! rendered by the shell.
//!
//! ## Ownership and lifetimes
//! `ViewState` owns all string values so it can be handed to a renderer on
//! another thread without borrowing controller state.
//!
//! ## Error model
//! Projection is infallible. The view never writes back to the session; user
//! actions go through the controller.

use kick_coach_core::{Foot, Recommendation, SessionSnapshot, UploadStatus};
use serde::Serialize;
use tracing::debug;

/// Flat display model for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    /// Description of the video on the playback surface.
    pub video: String,
    /// Exact score.
    pub score: f64,
    /// Score rounded for the gauge label.
    pub score_label: u8,
    /// Recommendations in display order.
    pub recommendations: Vec<Recommendation>,
    /// Current foot selection.
    pub selected_foot: Foot,
    /// Current attempt status.
    pub status: UploadStatus,
    /// Short status line.
    pub status_text: String,
    /// Inline error, present only after a failed attempt.
    pub error_message: Option<String>,
    /// Whether the file picker accepts a new selection.
    pub picker_enabled: bool,
    /// Whether to show the busy indicator.
    pub busy: bool,
}

impl ViewState {
    /// Projects a session snapshot into a view.
    pub fn project(snapshot: &SessionSnapshot) -> Self {
        let status = snapshot.upload_status;
        let error_message = (status == UploadStatus::Failed && !snapshot.error_message.is_empty())
            .then(|| snapshot.error_message.clone());

        Self {
            video: snapshot.video_source.describe(),
            score: snapshot.score.value(),
            score_label: snapshot.score.value().round().clamp(0.0, 100.0) as u8,
            recommendations: snapshot.recommendations.as_slice().to_vec(),
            selected_foot: snapshot.selected_foot,
            status,
            status_text: status_text(status).to_string(),
            error_message,
            picker_enabled: status != UploadStatus::Uploading,
            busy: matches!(status, UploadStatus::Validating | UploadStatus::Uploading),
        }
    }
}

fn status_text(status: UploadStatus) -> &'static str {
    match status {
        UploadStatus::Idle => "Select a kick video to analyze",
        UploadStatus::Validating => "Checking video...",
        UploadStatus::Uploading => "Analyzing kick...",
        UploadStatus::Succeeded => "Analysis complete",
        UploadStatus::Failed => "Analysis failed",
    }
}

/// Receives playback progress from the video surface.
///
/// Purely observational; nothing in the workflow depends on it.
pub trait PlaybackObserver: Send + Sync {
    /// Current playback position in seconds.
    fn on_time_update(&self, seconds: f64);

    /// Media duration in seconds, once known.
    fn on_duration_change(&self, seconds: f64);
}

/// Observer that records playback progress as debug events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPlaybackObserver;

impl PlaybackObserver for TracingPlaybackObserver {
    fn on_time_update(&self, seconds: f64) {
        debug!(stage = "playback", action = "time_update", seconds, "playback position");
    }

    fn on_duration_change(&self, seconds: f64) {
        debug!(stage = "playback", action = "duration", seconds, "playback duration");
    }
}
