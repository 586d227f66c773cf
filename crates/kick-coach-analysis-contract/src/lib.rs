#![warn(missing_docs)]
//! # kick-coach-analysis-contract
//!
//! ## Purpose
//! Defines the analysis service response schema and converts it into the
//! validated [`AnalysisResult`] consumed by the workflow controller.
//!
//! ## Responsibilities
//! - Parse the documented `{ videoUrl, score, recommendations }` body.
//! - Accept the older backend body `{ video, score, advice: { recommendations } }`
//!   where the analyzed video is inlined as base64.
//! - Reject bodies that would break session invariants (score range, unique
//!   recommendation ids) before anything is applied.
//!
//! ## Data flow
//! Raw JSON response -> [`parse_analysis_response`] -> [`AnalysisResponse`] ->
//! [`AnalysisResponse::into_result`] -> [`AnalysisResult`].
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs to avoid borrowing from transient network
//! buffers.
//!
//! ## Error model
//! Invalid JSON or missing mandatory fields return
//! [`AnalysisContractError::Decode`]; well-formed JSON that violates the
//! contract returns [`AnalysisContractError::InvalidContract`].

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use kick_coach_core::{AnalysisResult, Recommendation, Recommendations, Score, VideoSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Media type assumed for videos returned inline by the service.
pub const EMBEDDED_VIDEO_MEDIA_TYPE: &str = "video/mp4";

/// Analysis response body as sent by the service.
///
/// Exactly one of `video_url` / `video` and one of `recommendations` /
/// `advice` is expected; when both are present the documented field wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    /// Reference to the analyzed video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Base64-encoded analyzed video (older backend).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    /// Overall kick score.
    pub score: f64,
    /// Coaching recommendations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<WireRecommendation>>,
    /// Recommendation wrapper used by the older backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<Advice>,
}

/// Recommendation wrapper object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    /// Wrapped recommendations.
    pub recommendations: Vec<WireRecommendation>,
}

/// One recommendation as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecommendation {
    /// Identifier, unique within the response.
    pub id: String,
    /// Short headline.
    pub title: String,
    /// Longer advice text.
    pub description: String,
}

impl AnalysisResponse {
    /// Converts the wire body into a validated analysis result.
    ///
    /// # Errors
    /// Returns [`AnalysisContractError::InvalidContract`] when the video
    /// reference is missing or blank, the inline video is not valid base64,
    /// the score is outside `[0, 100]`, the recommendation list is missing,
    /// or recommendation ids are blank or repeated.
    pub fn into_result(self) -> Result<AnalysisResult, AnalysisContractError> {
        let score = Score::new(self.score)
            .map_err(|error| AnalysisContractError::InvalidContract(error.to_string()))?;

        let wire_recommendations = match (self.recommendations, self.advice) {
            (Some(recommendations), _) => recommendations,
            (None, Some(advice)) => advice.recommendations,
            (None, None) => {
                return Err(AnalysisContractError::InvalidContract(
                    "recommendations are missing".to_string(),
                ));
            }
        };

        if wire_recommendations
            .iter()
            .any(|item| item.id.trim().is_empty())
        {
            return Err(AnalysisContractError::InvalidContract(
                "recommendation id is empty".to_string(),
            ));
        }

        let recommendations = Recommendations::new(
            wire_recommendations
                .into_iter()
                .map(|item| Recommendation::new(item.id, item.title, item.description))
                .collect(),
        )
        .map_err(|error| AnalysisContractError::InvalidContract(error.to_string()))?;

        let video_source = video_source(self.video_url, self.video)?;

        Ok(AnalysisResult {
            video_source,
            score,
            recommendations,
        })
    }
}

fn video_source(
    video_url: Option<String>,
    inline_video: Option<String>,
) -> Result<VideoSource, AnalysisContractError> {
    if let Some(url) = video_url {
        if url.trim().is_empty() {
            return Err(AnalysisContractError::InvalidContract(
                "videoUrl is empty".to_string(),
            ));
        }
        return Ok(VideoSource::Remote(url));
    }

    let Some(encoded) = inline_video else {
        return Err(AnalysisContractError::InvalidContract(
            "response has neither videoUrl nor video".to_string(),
        ));
    };

    let bytes = BASE64.decode(encoded.trim()).map_err(|error| {
        AnalysisContractError::InvalidContract(format!("video is not valid base64: {error}"))
    })?;
    if bytes.is_empty() {
        return Err(AnalysisContractError::InvalidContract(
            "inline video is empty".to_string(),
        ));
    }

    Ok(VideoSource::Embedded {
        media_type: EMBEDDED_VIDEO_MEDIA_TYPE.to_string(),
        bytes,
    })
}

/// Parses a raw JSON body into a validated analysis result.
///
/// # Errors
/// Returns [`AnalysisContractError::Decode`] for invalid JSON or missing
/// mandatory fields, and [`AnalysisContractError::InvalidContract`] for
/// contract violations (see [`AnalysisResponse::into_result`]).
pub fn parse_analysis_response(raw: &str) -> Result<AnalysisResult, AnalysisContractError> {
    let parsed: AnalysisResponse =
        serde_json::from_str(raw).map_err(AnalysisContractError::Decode)?;
    parsed.into_result()
}

/// Analysis contract errors.
#[derive(Debug, Error)]
pub enum AnalysisContractError {
    /// JSON decode failure.
    #[error("analysis decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed payload violates contract invariants.
    #[error("analysis contract violation: {0}")]
    InvalidContract(String),
}
