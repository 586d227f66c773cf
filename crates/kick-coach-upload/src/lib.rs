#![warn(missing_docs)]
//! # kick-coach-upload
//!
//! ## Purpose
//! Builds analysis requests and performs the single network exchange with the
//! external analysis service.
//!
//! ## Responsibilities
//! - Package an accepted video and the foot selection as a multipart request.
//! - Execute the request through an injectable [`AnalysisTransport`].
//! - Map HTTP status, transport faults, and response bodies into a typed
//!   [`AnalysisError`] or a validated [`AnalysisResult`].
//!
//! ## Data flow
//! Accepted [`CandidateFile`] + [`Foot`] -> [`build_upload_request`] ->
//! [`AnalysisClient::submit`] -> [`AnalysisTransport::post_multipart`] ->
//! status check -> [`parse_analysis_response`] -> [`AnalysisResult`].
//!
//! ## Ownership and lifetimes
//! [`UploadRequest`] takes ownership of the file bytes; the request is moved
//! into the transport so a large video is never duplicated between stages.
//! The foot value is captured when the request is built.
//!
//! ## Error model
//! Every failure after validation is one of three [`AnalysisError`] kinds.
//! No retries are performed here; callers decide what to do with a failure.
//!
//! ## Security and privacy notes
//! Video bytes are never logged; attempts are correlated by a SHA-256 content
//! digest instead.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kick_coach_analysis_contract::{AnalysisContractError, parse_analysis_response};
use kick_coach_core::{AnalysisResult, CandidateFile, Foot};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// Default per-request timeout for [`HttpTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Multipart field naming understood by the analysis service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormLayout {
    /// `video` (file) + `foot` (`left` / `right`).
    #[default]
    Standard,
    /// `file` (file) + `rightFoot` (`true` / `false`), as accepted by older
    /// backend deployments.
    Legacy,
}

impl FromStr for FormLayout {
    type Err = ClientSetupError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "legacy" => Ok(Self::Legacy),
            other => Err(ClientSetupError::UnknownFormLayout(other.to_string())),
        }
    }
}

/// Payload of one multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Plain text field.
    Text(&'static str),
    /// Binary file field.
    File {
        /// File name sent in the content disposition.
        file_name: &'a str,
        /// Part content type.
        media_type: &'a str,
        /// Raw bytes.
        bytes: &'a [u8],
    },
}

/// One multipart field in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField<'a> {
    /// Field name.
    pub name: &'static str,
    /// Field payload.
    pub value: FieldValue<'a>,
}

/// Outbound request for one analysis attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadRequest {
    file_name: String,
    media_type: String,
    video: Vec<u8>,
    foot: Foot,
    layout: FormLayout,
    content_digest: String,
}

impl UploadRequest {
    /// Returns the uploaded file's display name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the foot captured when the request was built.
    pub fn foot(&self) -> Foot {
        self.foot
    }

    /// Returns the multipart layout.
    pub fn layout(&self) -> FormLayout {
        self.layout
    }

    /// Returns the hex SHA-256 digest of the video bytes.
    pub fn content_digest(&self) -> &str {
        &self.content_digest
    }

    /// Returns the video size in bytes.
    pub fn video_len(&self) -> usize {
        self.video.len()
    }

    /// Lists the multipart fields in wire order.
    pub fn fields(&self) -> Vec<FormField<'_>> {
        let (foot_name, foot_value) = self.foot_field();
        vec![
            FormField {
                name: self.video_field_name(),
                value: FieldValue::File {
                    file_name: &self.file_name,
                    media_type: &self.media_type,
                    bytes: &self.video,
                },
            },
            FormField {
                name: foot_name,
                value: FieldValue::Text(foot_value),
            },
        ]
    }

    fn video_field_name(&self) -> &'static str {
        match self.layout {
            FormLayout::Standard => "video",
            FormLayout::Legacy => "file",
        }
    }

    fn foot_field(&self) -> (&'static str, &'static str) {
        match (self.layout, self.foot) {
            (FormLayout::Standard, foot) => ("foot", foot.as_str()),
            (FormLayout::Legacy, Foot::Right) => ("rightFoot", "true"),
            (FormLayout::Legacy, Foot::Left) => ("rightFoot", "false"),
        }
    }

    fn into_multipart(self) -> Result<reqwest::multipart::Form, TransportFault> {
        let video_name = self.video_field_name();
        let (foot_name, foot_value) = self.foot_field();

        let part = reqwest::multipart::Part::bytes(self.video)
            .file_name(self.file_name)
            .mime_str(&self.media_type)
            .map_err(|error| TransportFault::Request(format!("invalid part type: {error}")))?;

        Ok(reqwest::multipart::Form::new()
            .part(video_name, part)
            .text(foot_name, foot_value))
    }
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("video_len", &self.video.len())
            .field("foot", &self.foot)
            .field("layout", &self.layout)
            .field("content_digest", &self.content_digest)
            .finish()
    }
}

/// Builds the request for one analysis attempt.
///
/// The file is not validated here; callers must run admission checks first.
pub fn build_upload_request(file: CandidateFile, foot: Foot, layout: FormLayout) -> UploadRequest {
    let content_digest = content_digest(&file.contents);
    UploadRequest {
        file_name: file.display_name,
        media_type: file.media_type,
        video: file.contents,
        foot,
        layout,
        content_digest,
    }
}

/// Returns the lowercase hex SHA-256 digest of `bytes`.
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Raw response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

/// Network exchange used by [`AnalysisClient`].
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Sends one multipart POST to `endpoint`.
    async fn post_multipart(
        &self,
        endpoint: &Url,
        request: UploadRequest,
    ) -> Result<TransportResponse, TransportFault>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport whose requests fail with
    /// [`TransportFault::Timeout`] after `timeout`.
    ///
    /// # Errors
    /// Returns [`ClientSetupError::HttpClient`] when the TLS backend cannot be
    /// initialized.
    pub fn new(timeout: Duration) -> Result<Self, ClientSetupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ClientSetupError::HttpClient(error.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    async fn post_multipart(
        &self,
        endpoint: &Url,
        request: UploadRequest,
    ) -> Result<TransportResponse, TransportFault> {
        let form = request.into_multipart()?;
        let response = self
            .client
            .post(endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(TransportFault::from)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(TransportFault::from)?;
        Ok(TransportResponse { status, body })
    }
}

/// Client for the external analysis endpoint.
#[derive(Clone)]
pub struct AnalysisClient {
    endpoint: Url,
    transport: Arc<dyn AnalysisTransport>,
}

impl AnalysisClient {
    /// Creates a client bound to `endpoint`.
    ///
    /// # Errors
    /// Returns [`ClientSetupError::InvalidEndpoint`] unless `endpoint` is an
    /// absolute `http` or `https` URL.
    pub fn new(
        endpoint: &str,
        transport: Arc<dyn AnalysisTransport>,
    ) -> Result<Self, ClientSetupError> {
        let endpoint = validate_endpoint(endpoint)?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Performs exactly one analysis exchange.
    ///
    /// # Errors
    /// - [`AnalysisError::ServiceError`] for non-2xx statuses.
    /// - [`AnalysisError::TransportError`] for connection, timeout, or body
    ///   read failures, and for a 2xx body that is not JSON at all.
    /// - [`AnalysisError::MalformedResponse`] when a 2xx JSON body lacks
    ///   required fields or carries out-of-range values.
    pub async fn submit(&self, request: UploadRequest) -> Result<AnalysisResult, AnalysisError> {
        info!(
            stage = "analysis",
            action = "submit",
            file = request.file_name(),
            foot = %request.foot(),
            bytes = request.video_len(),
            digest = request.content_digest(),
            "sending analysis request"
        );

        let response = self
            .transport
            .post_multipart(&self.endpoint, request)
            .await
            .map_err(AnalysisError::TransportError)?;

        if !(200..300).contains(&response.status) {
            return Err(AnalysisError::ServiceError {
                status: response.status,
            });
        }

        let result = parse_analysis_response(&response.body).map_err(classify_body_error)?;

        info!(
            stage = "analysis",
            action = "response",
            score = result.score.value(),
            recommendations = result.recommendations.len(),
            "analysis response accepted"
        );
        Ok(result)
    }
}

fn classify_body_error(error: AnalysisContractError) -> AnalysisError {
    match error {
        AnalysisContractError::Decode(decode) if decode.is_syntax() || decode.is_eof() => {
            AnalysisError::TransportError(TransportFault::Body(decode.to_string()))
        }
        other => AnalysisError::MalformedResponse(other),
    }
}

/// Validates that `endpoint` is an absolute http(s) URL.
///
/// # Errors
/// Returns [`ClientSetupError::InvalidEndpoint`] otherwise.
pub fn validate_endpoint(endpoint: &str) -> Result<Url, ClientSetupError> {
    let parsed = Url::parse(endpoint).map_err(|error| {
        ClientSetupError::InvalidEndpoint(format!("invalid analysis url: {error}"))
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ClientSetupError::InvalidEndpoint(format!(
                "unsupported scheme {other:?}"
            )));
        }
    }

    if parsed.scheme() == "http" {
        warn!(
            stage = "analysis",
            action = "endpoint",
            endpoint = %parsed,
            "analysis endpoint is not using https"
        );
    }

    Ok(parsed)
}

/// Transport-level fault before a complete response was read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFault {
    /// Could not connect to the service.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The exchange exceeded its timeout.
    #[error("request timed out")]
    Timeout,
    /// The response body could not be read or is not JSON.
    #[error("response body unreadable: {0}")]
    Body(String),
    /// The request could not be constructed or sent.
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportFault {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            Self::Body(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

/// Diagnostic category of an [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Service answered with a non-success status.
    Service,
    /// Exchange failed below HTTP.
    Transport,
    /// Success status with an unusable body.
    Malformed,
}

impl FailureKind {
    /// Stable lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Transport => "transport",
            Self::Malformed => "malformed",
        }
    }
}

/// Failures of one analysis exchange.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Non-success HTTP status.
    #[error("analysis service returned status {status}")]
    ServiceError {
        /// HTTP status code.
        status: u16,
    },
    /// Connection, timeout, body read failure, or a body that is not JSON.
    #[error("analysis transport failure: {0}")]
    TransportError(TransportFault),
    /// JSON body violated the analysis contract.
    #[error("malformed analysis response: {0}")]
    MalformedResponse(AnalysisContractError),
}

impl AnalysisError {
    /// Returns the diagnostic category.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ServiceError { .. } => FailureKind::Service,
            Self::TransportError(_) => FailureKind::Transport,
            Self::MalformedResponse(_) => FailureKind::Malformed,
        }
    }
}

/// Errors raised while configuring the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientSetupError {
    /// Endpoint is not an absolute http(s) URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// HTTP client construction failed.
    #[error("http client setup failed: {0}")]
    HttpClient(String),
    /// Form layout name is not recognized.
    #[error("unknown form layout {0:?}, expected standard or legacy")]
    UnknownFormLayout(String),
}
