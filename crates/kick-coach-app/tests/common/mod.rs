//! Shared fixtures for app integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kick_coach_app::WorkflowController;
use kick_coach_core::{CandidateFile, SessionDefaults};
use kick_coach_upload::{
    AnalysisClient, AnalysisTransport, FormLayout, TransportFault, TransportResponse,
    UploadRequest,
};
use url::Url;

pub const MIB: u64 = 1024 * 1024;

/// Body returned by the service in the reference success scenario.
#[allow(dead_code)]
pub const SCENARIO_A_BODY: &str = r#"{
    "videoUrl":"v2.mp4",
    "score":88,
    "recommendations":[{"id":"9","title":"X","description":"Y"}]
}"#;

/// Transport that replays queued outcomes in order and records requests.
#[derive(Debug, Default)]
pub struct QueuedTransport {
    outcomes: Mutex<VecDeque<Result<TransportResponse, TransportFault>>>,
    requests: Mutex<Vec<UploadRequest>>,
}

impl QueuedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[allow(dead_code)]
    pub fn push_response(&self, status: u16, body: &str) {
        self.outcomes
            .lock()
            .expect("outcome queue lock")
            .push_back(Ok(TransportResponse {
                status,
                body: body.to_string(),
            }));
    }

    #[allow(dead_code)]
    pub fn push_fault(&self, fault: TransportFault) {
        self.outcomes
            .lock()
            .expect("outcome queue lock")
            .push_back(Err(fault));
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("request log lock").len()
    }

    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<UploadRequest> {
        self.requests.lock().expect("request log lock").clone()
    }
}

#[async_trait]
impl AnalysisTransport for QueuedTransport {
    async fn post_multipart(
        &self,
        _endpoint: &Url,
        request: UploadRequest,
    ) -> Result<TransportResponse, TransportFault> {
        self.requests
            .lock()
            .expect("request log lock")
            .push(request);
        self.outcomes
            .lock()
            .expect("outcome queue lock")
            .pop_front()
            .unwrap_or_else(|| Err(TransportFault::Connect("no scripted outcome".to_string())))
    }
}

/// Transport whose exchange never completes.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct StalledTransport;

#[async_trait]
impl AnalysisTransport for StalledTransport {
    async fn post_multipart(
        &self,
        _endpoint: &Url,
        _request: UploadRequest,
    ) -> Result<TransportResponse, TransportFault> {
        std::future::pending().await
    }
}

/// Controller wired to `transport` with seed defaults.
pub fn controller_with<T>(transport: Arc<T>) -> WorkflowController
where
    T: AnalysisTransport + 'static,
{
    let client = AnalysisClient::new("https://coach.example.test/get_stuff", transport)
        .expect("test endpoint should be valid");
    WorkflowController::new(client, SessionDefaults::seed(), FormLayout::Standard)
}

/// Candidate with a declared size and a tiny body.
#[allow(dead_code)]
pub fn declared_file(name: &str, media_type: &str, size_bytes: u64) -> CandidateFile {
    CandidateFile {
        display_name: name.to_string(),
        media_type: media_type.to_string(),
        size_bytes,
        contents: vec![0, 0, 0, 24, b'f', b't', b'y', b'p'],
    }
}
