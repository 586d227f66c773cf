//! Workflow controller: owns session state and sequences validation,
//! submission, and result application for one analysis attempt at a time.
//!
//! State machine:
//!
//! ```text
//! idle | succeeded | failed --select--> validating --reject--> failed
//!                                       validating --accept--> uploading
//! uploading --analysis ok--> succeeded
//! uploading --analysis error--> failed
//! ```
//!
//! A selection while `uploading` is refused with
//! [`WorkflowError::AttemptInFlight`] and leaves the running attempt alone.
//! An attempt whose outcome will never arrive (dropped [`PendingAttempt`],
//! cancelled [`WorkflowController::select_file`]) settles as `failed`.

use kick_coach_core::{
    AnalysisResult, CandidateFile, Foot, Recommendations, Score, SessionDefaults,
    SessionSnapshot, UploadStatus, ValidationError, VideoSource, validate_candidate,
};
use kick_coach_upload::{
    AnalysisClient, AnalysisError, FormLayout, UploadRequest, build_upload_request,
};
use thiserror::Error;
use tracing::{info, warn};

/// Message shown after any request-phase failure.
pub const RETRY_MESSAGE: &str = "Analysis failed. Please try again.";

/// Identifies one analysis attempt within a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

impl AttemptId {
    /// Returns the raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// User-facing notifications emitted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// An analysis completed and its results are now displayed.
    AnalysisSucceeded {
        /// Display name of the analyzed file.
        file_name: String,
    },
}

/// Result of the synchronous half of a file selection.
#[derive(Debug)]
pub enum Prepared {
    /// File accepted; the attempt must be submitted and its outcome applied.
    Submit(PendingAttempt),
    /// File refused by admission policy; the session is now `Failed`.
    Rejected(ValidationError),
}

/// Accepted attempt awaiting submission.
#[derive(Debug)]
pub struct PendingAttempt {
    id: AttemptId,
    request: UploadRequest,
}

impl PendingAttempt {
    /// Returns the attempt id.
    pub fn id(&self) -> AttemptId {
        self.id
    }

    /// Returns the request that will be sent.
    pub fn request(&self) -> &UploadRequest {
        &self.request
    }

    /// Submits the request; the only suspending step of an attempt.
    pub async fn run(self, client: &AnalysisClient) -> AttemptOutcome {
        let file_name = self.request.file_name().to_string();
        let result = client.submit(self.request).await;
        AttemptOutcome {
            attempt: self.id,
            file_name,
            result,
        }
    }
}

/// Settled analysis exchange, ready to be applied to the session.
#[derive(Debug)]
pub struct AttemptOutcome {
    /// Attempt the outcome belongs to.
    pub attempt: AttemptId,
    /// Display name of the submitted file.
    pub file_name: String,
    /// Analysis result or failure.
    pub result: Result<AnalysisResult, AnalysisError>,
}

#[derive(Debug)]
struct SessionState {
    video_source: VideoSource,
    selected_foot: Foot,
    upload_status: UploadStatus,
    error_message: String,
    score: Score,
    recommendations: Recommendations,
}

/// Owns the analysis session and is the only writer of its state.
pub struct WorkflowController {
    client: AnalysisClient,
    layout: FormLayout,
    state: SessionState,
    in_flight: Option<AttemptId>,
    next_attempt: u64,
    notifications: Vec<Notification>,
}

impl WorkflowController {
    /// Creates a controller whose session starts from `defaults`.
    pub fn new(client: AnalysisClient, defaults: SessionDefaults, layout: FormLayout) -> Self {
        Self {
            client,
            layout,
            state: SessionState {
                video_source: defaults.video_source,
                selected_foot: defaults.foot,
                upload_status: UploadStatus::Idle,
                error_message: String::new(),
                score: defaults.score,
                recommendations: defaults.recommendations,
            },
            in_flight: None,
            next_attempt: 1,
            notifications: Vec::new(),
        }
    }

    /// Returns the analysis client used for submissions.
    pub fn client(&self) -> &AnalysisClient {
        &self.client
    }

    /// Returns the current attempt status.
    pub fn status(&self) -> UploadStatus {
        self.state.upload_status
    }

    /// Returns the current foot selection.
    pub fn selected_foot(&self) -> Foot {
        self.state.selected_foot
    }

    /// Returns the in-flight attempt, if any.
    pub fn in_flight(&self) -> Option<AttemptId> {
        self.in_flight
    }

    /// Returns a read-only copy of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            video_source: self.state.video_source.clone(),
            selected_foot: self.state.selected_foot,
            upload_status: self.state.upload_status,
            error_message: self.state.error_message.clone(),
            score: self.state.score,
            recommendations: self.state.recommendations.clone(),
        }
    }

    /// Removes and returns pending notifications in emission order.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Changes the foot used by the next attempt.
    ///
    /// Does not touch the attempt status or any request already built.
    pub fn select_foot(&mut self, foot: Foot) {
        info!(
            stage = "workflow",
            action = "select_foot",
            foot = %foot,
            status = ?self.state.upload_status,
            "foot selection changed"
        );
        self.state.selected_foot = foot;
    }

    /// Validates `file` and, on acceptance, builds its request.
    ///
    /// # Errors
    /// Returns [`WorkflowError::AttemptInFlight`] while another attempt is
    /// uploading; the session is left untouched in that case.
    pub fn prepare_attempt(&mut self, file: CandidateFile) -> Result<Prepared, WorkflowError> {
        if let Some(current) = self.in_flight {
            warn!(
                stage = "workflow",
                action = "select_file_refused",
                file = %file.display_name,
                in_flight = current.get(),
                "selection ignored while an analysis is running"
            );
            return Err(WorkflowError::AttemptInFlight(current));
        }

        self.state.upload_status = UploadStatus::Validating;
        self.state.error_message.clear();
        info!(
            stage = "workflow",
            action = "validating",
            file = %file.display_name,
            media_type = %file.media_type,
            size_bytes = file.size_bytes,
            "validating selected file"
        );

        if let Err(error) = validate_candidate(&file) {
            warn!(
                stage = "workflow",
                action = "rejected",
                file = %file.display_name,
                reason = %error,
                "file rejected before upload"
            );
            self.fail(error.user_message());
            return Ok(Prepared::Rejected(error));
        }

        let id = AttemptId(self.next_attempt);
        self.next_attempt += 1;
        let request = build_upload_request(file, self.state.selected_foot, self.layout);

        self.state.upload_status = UploadStatus::Uploading;
        self.in_flight = Some(id);
        info!(
            stage = "workflow",
            action = "uploading",
            attempt = id.get(),
            foot = %request.foot(),
            "analysis attempt started"
        );

        Ok(Prepared::Submit(PendingAttempt { id, request }))
    }

    /// Applies a settled exchange to the session.
    ///
    /// On success the video, score, and recommendations are replaced together
    /// and a notification is queued; on failure they are left unchanged.
    ///
    /// # Errors
    /// Returns [`WorkflowError::StaleOutcome`] when `outcome` does not belong
    /// to the in-flight attempt; nothing is applied.
    pub fn apply_outcome(&mut self, outcome: AttemptOutcome) -> Result<UploadStatus, WorkflowError> {
        if self.in_flight != Some(outcome.attempt) {
            warn!(
                stage = "workflow",
                action = "stale_outcome",
                attempt = outcome.attempt.get(),
                "outcome does not match the running attempt"
            );
            return Err(WorkflowError::StaleOutcome(outcome.attempt));
        }
        self.in_flight = None;

        match outcome.result {
            Ok(result) => {
                info!(
                    stage = "workflow",
                    action = "succeeded",
                    attempt = outcome.attempt.get(),
                    video = %result.video_source.describe(),
                    score = result.score.value(),
                    "analysis applied"
                );
                self.state.video_source = result.video_source;
                self.state.score = result.score;
                self.state.recommendations = result.recommendations;
                self.state.error_message.clear();
                self.state.upload_status = UploadStatus::Succeeded;
                self.notifications.push(Notification::AnalysisSucceeded {
                    file_name: outcome.file_name,
                });
            }
            Err(error) => {
                warn!(
                    stage = "workflow",
                    action = "failed",
                    attempt = outcome.attempt.get(),
                    kind = error.kind().as_str(),
                    error = %error,
                    "analysis attempt failed"
                );
                self.fail(RETRY_MESSAGE.to_string());
            }
        }

        Ok(self.state.upload_status)
    }

    /// Settles an in-flight attempt whose outcome will never be applied.
    ///
    /// Hosts using the two-phase API call this when they drop a
    /// [`PendingAttempt`]. The session moves to `Failed` with
    /// [`RETRY_MESSAGE`] and a new attempt can start.
    ///
    /// # Errors
    /// Returns [`WorkflowError::StaleOutcome`] when `attempt` is not the
    /// in-flight attempt; nothing changes.
    pub fn abandon_attempt(&mut self, attempt: AttemptId) -> Result<UploadStatus, WorkflowError> {
        if self.in_flight != Some(attempt) {
            return Err(WorkflowError::StaleOutcome(attempt));
        }
        self.in_flight = None;
        warn!(
            stage = "workflow",
            action = "abandoned",
            attempt = attempt.get(),
            "analysis attempt abandoned before its outcome arrived"
        );
        self.fail(RETRY_MESSAGE.to_string());
        Ok(self.state.upload_status)
    }

    /// Runs a full attempt for `file`: validate, submit, apply.
    ///
    /// Dropping the returned future mid-request abandons the attempt.
    ///
    /// # Errors
    /// Returns [`WorkflowError::AttemptInFlight`] while another attempt is
    /// uploading.
    pub async fn select_file(&mut self, file: CandidateFile) -> Result<UploadStatus, WorkflowError> {
        match self.prepare_attempt(file)? {
            Prepared::Rejected(_) => Ok(self.state.upload_status),
            Prepared::Submit(pending) => {
                let client = self.client.clone();
                let guard = InFlightGuard {
                    attempt: pending.id(),
                    controller: Some(self),
                };
                let outcome = pending.run(&client).await;
                guard.settle(outcome)
            }
        }
    }

    fn fail(&mut self, message: String) {
        debug_assert!(!message.is_empty());
        self.state.error_message = message;
        self.state.upload_status = UploadStatus::Failed;
    }
}

/// Abandons its attempt on drop unless the outcome was applied.
struct InFlightGuard<'a> {
    attempt: AttemptId,
    controller: Option<&'a mut WorkflowController>,
}

impl InFlightGuard<'_> {
    fn settle(mut self, outcome: AttemptOutcome) -> Result<UploadStatus, WorkflowError> {
        match self.controller.take() {
            Some(controller) => controller.apply_outcome(outcome),
            None => Err(WorkflowError::StaleOutcome(outcome.attempt)),
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(controller) = self.controller.take() {
            let _ = controller.abandon_attempt(self.attempt);
        }
    }
}

/// Workflow transition errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Another attempt is still uploading.
    #[error("attempt {} is still in flight", .0.get())]
    AttemptInFlight(AttemptId),
    /// Outcome does not belong to the in-flight attempt.
    #[error("outcome for attempt {} is stale", .0.get())]
    StaleOutcome(AttemptId),
}
