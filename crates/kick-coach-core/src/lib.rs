#![warn(missing_docs)]
//! # kick-coach-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `kick-coach` workspace and
//! the file admission policy applied before any analysis request is built.
//!
//! ## Responsibilities
//! - Represent candidate video files, foot selection, scores, and coaching
//!   recommendations.
//! - Guarantee the session invariants at the type level (score bounds, unique
//!   recommendation ids).
//! - Validate candidate files against media type and size limits.
//!
//! ## Data flow
//! A file picker yields a [`CandidateFile`] -> [`validate_candidate`] accepts
//! or rejects it -> accepted files are handed to the upload layer. Analysis
//! results arrive as [`AnalysisResult`] and replace the session values held in
//! a [`SessionSnapshot`].
//!
//! ## Ownership and lifetimes
//! Files and results own their buffers (`Vec<u8>`, `String`) so an attempt
//! can outlive the UI event that produced it without borrowing from it.
//!
//! ## Error model
//! Admission failures return [`ValidationError`]; invariant violations while
//! constructing model values return [`CoreError`].
//!
//! ## Example
//! ```rust
//! use kick_coach_core::{CandidateFile, ValidationError, validate_candidate};
//!
//! let clip = CandidateFile::new("kick.mp4", "video/mp4", vec![0; 16]);
//! assert!(validate_candidate(&clip).is_ok());
//!
//! let photo = CandidateFile::new("kick.png", "image/png", vec![0; 16]);
//! assert_eq!(validate_candidate(&photo), Err(ValidationError::WrongType("image/png".to_string())));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted upload size in bytes (100 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Lower bound of the analysis score range.
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of the analysis score range.
pub const SCORE_MAX: f64 = 100.0;

/// Which foot performed the kick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Foot {
    /// Left foot.
    Left,
    /// Right foot.
    #[default]
    Right,
}

impl Foot {
    /// Returns the wire representation (`left` / `right`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Foot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Foot {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(CoreError::UnknownFoot(raw.to_string())),
        }
    }
}

/// Lifecycle status of the current analysis attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// No attempt has been made yet.
    #[default]
    Idle,
    /// A selected file is being checked against admission policy.
    Validating,
    /// The analysis request is in flight.
    Uploading,
    /// The last attempt produced an applied analysis result.
    Succeeded,
    /// The last attempt failed; see the session error message.
    Failed,
}

/// Analysis score guaranteed to lie in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// Creates a bounded score.
    ///
    /// # Errors
    /// Returns [`CoreError::ScoreOutOfRange`] for non-finite values or values
    /// outside `[0, 100]`.
    pub fn new(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&value) {
            return Err(CoreError::ScoreOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw score value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One coaching recommendation produced by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Identifier unique within one recommendation list.
    pub id: String,
    /// Short headline.
    pub title: String,
    /// Longer coaching advice.
    pub description: String,
}

impl Recommendation {
    /// Convenience constructor.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Ordered recommendation list with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Recommendations(Vec<Recommendation>);

impl Recommendations {
    /// Builds a list, preserving order.
    ///
    /// # Errors
    /// Returns [`CoreError::DuplicateRecommendationId`] when two entries share
    /// an id.
    pub fn new(items: Vec<Recommendation>) -> Result<Self, CoreError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(CoreError::DuplicateRecommendationId(item.id.clone()));
            }
        }
        Ok(Self(items))
    }

    /// Returns entries in display order.
    pub fn as_slice(&self) -> &[Recommendation] {
        &self.0
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Recommendation> {
        self.0.iter()
    }
}

/// Video currently shown on the playback surface.
#[derive(Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// URL or opaque reference resolvable by the playback surface.
    Remote(String),
    /// Analyzed video returned inline by the service.
    Embedded {
        /// Media type of `bytes`.
        media_type: String,
        /// Encoded video bytes.
        bytes: Vec<u8>,
    },
}

impl VideoSource {
    /// Short human-readable description suitable for logs and status text.
    pub fn describe(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::Embedded { media_type, bytes } => {
                format!("embedded {media_type} ({} bytes)", bytes.len())
            }
        }
    }
}

// Embedded videos are large; keep Debug output to the summary.
impl fmt::Debug for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.debug_tuple("Remote").field(url).finish(),
            Self::Embedded { media_type, bytes } => f
                .debug_struct("Embedded")
                .field("media_type", media_type)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Authoritative replacement for session values after a successful analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Analyzed (annotated) video.
    pub video_source: VideoSource,
    /// Overall kick score.
    pub score: Score,
    /// Coaching recommendations.
    pub recommendations: Recommendations,
}

/// Placeholder video shown before any analysis completes.
pub const DEFAULT_VIDEO_URL: &str =
    "https://storage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

/// Score shown before any analysis completes.
pub const DEFAULT_SCORE: f64 = 75.0;

/// Seed recommendations shown before any analysis completes, as
/// `(id, title, description)`.
pub const DEFAULT_RECOMMENDATIONS: [(&str, &str, &str); 3] = [
    (
        "1",
        "Improve Follow Through",
        "Extend your kicking leg fully after contact with the ball for better power and accuracy.",
    ),
    (
        "2",
        "Plant Foot Position",
        "Position your plant foot closer to the ball for better stability and control.",
    ),
    (
        "3",
        "Hip Rotation",
        "Increase hip rotation during the shot to generate more power in your kicks.",
    ),
];

/// Initial session values supplied when a controller is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDefaults {
    /// Initial video source.
    pub video_source: VideoSource,
    /// Initial score.
    pub score: Score,
    /// Initial recommendations.
    pub recommendations: Recommendations,
    /// Initial foot selection.
    pub foot: Foot,
}

impl SessionDefaults {
    /// Returns the built-in seed values.
    pub fn seed() -> Self {
        let recommendations = DEFAULT_RECOMMENDATIONS
            .iter()
            .map(|(id, title, description)| Recommendation::new(*id, *title, *description))
            .collect();

        Self {
            video_source: VideoSource::Remote(DEFAULT_VIDEO_URL.to_string()),
            score: Score(DEFAULT_SCORE),
            recommendations: Recommendations(recommendations),
            foot: Foot::default(),
        }
    }
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self::seed()
    }
}

/// Read-only copy of session state handed to presentational consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Currently displayed video.
    pub video_source: VideoSource,
    /// Current foot selection.
    pub selected_foot: Foot,
    /// Current attempt status.
    pub upload_status: UploadStatus,
    /// Inline error text; empty unless `upload_status` is `Failed`.
    pub error_message: String,
    /// Current score.
    pub score: Score,
    /// Current recommendations.
    pub recommendations: Recommendations,
}

/// File chosen by the user for analysis.
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Name shown to the user.
    pub display_name: String,
    /// Declared media type (for example `video/mp4`).
    pub media_type: String,
    /// Size reported by the picker or filesystem.
    pub size_bytes: u64,
    /// Raw file bytes.
    pub contents: Vec<u8>,
}

impl CandidateFile {
    /// Builds a candidate whose size is taken from `contents`.
    pub fn new(
        display_name: impl Into<String>,
        media_type: impl Into<String>,
        contents: Vec<u8>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            media_type: media_type.into(),
            size_bytes: contents.len() as u64,
            contents,
        }
    }
}

impl fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateFile")
            .field("display_name", &self.display_name)
            .field("media_type", &self.media_type)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

/// Checks a candidate file against the admission policy.
///
/// The size limit is checked first, so an oversized file is reported as
/// [`ValidationError::TooLarge`] whatever its declared type.
///
/// # Errors
/// Returns [`ValidationError::TooLarge`] above [`MAX_UPLOAD_BYTES`] and
/// [`ValidationError::WrongType`] when the declared type is not `video/*`.
pub fn validate_candidate(file: &CandidateFile) -> Result<(), ValidationError> {
    if file.size_bytes > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size_bytes: file.size_bytes,
            limit_bytes: MAX_UPLOAD_BYTES,
        });
    }

    if !is_video_media_type(&file.media_type) {
        return Err(ValidationError::WrongType(file.media_type.clone()));
    }

    Ok(())
}

/// Returns `true` for `video/<subtype>` media types, ignoring parameters and
/// case.
pub fn is_video_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    match essence.split_once('/') {
        Some((kind, subtype)) => kind.eq_ignore_ascii_case("video") && !subtype.trim().is_empty(),
        None => false,
    }
}

/// Reasons a candidate file is refused before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Declared media type is not a video type.
    #[error("unsupported media type: {0:?}")]
    WrongType(String),
    /// File exceeds the upload size limit.
    #[error("file is {size_bytes} bytes, limit is {limit_bytes}")]
    TooLarge {
        /// Reported file size.
        size_bytes: u64,
        /// Configured limit.
        limit_bytes: u64,
    },
}

impl ValidationError {
    /// Message shown inline to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::WrongType(_) => "Please select a video file.".to_string(),
            Self::TooLarge { limit_bytes, .. } => format!(
                "File is too large. Please select a video under {} MB.",
                limit_bytes / (1024 * 1024)
            ),
        }
    }
}

/// Error type for model invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Score is non-finite or outside `[0, 100]`.
    #[error("score {0} is outside [0, 100]")]
    ScoreOutOfRange(f64),
    /// Two recommendations share an id.
    #[error("duplicate recommendation id {0:?}")]
    DuplicateRecommendationId(String),
    /// Foot name is neither `left` nor `right`.
    #[error("unknown foot {0:?}, expected left or right")]
    UnknownFoot(String),
}
