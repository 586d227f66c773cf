//! Shared fixtures for upload integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kick_coach_core::{CandidateFile, Foot};
use kick_coach_upload::{
    AnalysisClient, AnalysisTransport, FormLayout, TransportFault, TransportResponse,
    UploadRequest, build_upload_request,
};
use url::Url;

/// Transport that replays one scripted outcome and records every request.
#[derive(Debug)]
pub struct ScriptedTransport {
    outcome: Result<TransportResponse, TransportFault>,
    pub requests: Mutex<Vec<(Url, UploadRequest)>>,
}

impl ScriptedTransport {
    #[allow(dead_code)]
    pub fn responding(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    #[allow(dead_code)]
    pub fn failing(fault: TransportFault) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(fault),
            requests: Mutex::new(Vec::new()),
        })
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("request log lock").len()
    }
}

#[async_trait]
impl AnalysisTransport for ScriptedTransport {
    async fn post_multipart(
        &self,
        endpoint: &Url,
        request: UploadRequest,
    ) -> Result<TransportResponse, TransportFault> {
        self.requests
            .lock()
            .expect("request log lock")
            .push((endpoint.clone(), request));
        self.outcome.clone()
    }
}

/// Builds a client against a fixed test endpoint.
#[allow(dead_code)]
pub fn client_for(transport: Arc<ScriptedTransport>) -> AnalysisClient {
    AnalysisClient::new("https://coach.example.test/get_stuff", transport)
        .expect("test endpoint should be valid")
}

/// Small request fixture.
#[allow(dead_code)]
pub fn fixture_request(foot: Foot) -> UploadRequest {
    build_upload_request(
        CandidateFile::new("kick.mp4", "video/mp4", vec![0, 1, 2, 3]),
        foot,
        FormLayout::Standard,
    )
}

/// Valid documented response body.
#[allow(dead_code)]
pub const VALID_BODY: &str = r#"{
    "videoUrl":"v2.mp4",
    "score":88,
    "recommendations":[{"id":"9","title":"X","description":"Y"}]
}"#;
