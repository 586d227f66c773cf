//! Integration tests for analysis client response mapping.

mod common;

use kick_coach_core::{Foot, VideoSource};
use kick_coach_upload::{AnalysisError, FailureKind, TransportFault};

#[tokio::test]
async fn analysis_client_tests_parses_successful_response() {
    let transport = common::ScriptedTransport::responding(200, common::VALID_BODY);
    let client = common::client_for(transport.clone());

    let result = client
        .submit(common::fixture_request(Foot::Right))
        .await
        .expect("analysis should succeed");

    assert_eq!(result.score.value(), 88.0);
    assert_eq!(result.video_source, VideoSource::Remote("v2.mp4".to_string()));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn analysis_client_tests_maps_error_status_to_service_error() {
    for status in [400, 404, 500, 503] {
        let transport = common::ScriptedTransport::responding(status, common::VALID_BODY);
        let client = common::client_for(transport.clone());

        let error = client
            .submit(common::fixture_request(Foot::Right))
            .await
            .expect_err("non-success status should fail");

        assert!(matches!(error, AnalysisError::ServiceError { status: s } if s == status));
        assert_eq!(error.kind(), FailureKind::Service);
        assert_eq!(transport.call_count(), 1, "no retries expected");
    }
}

#[tokio::test]
async fn analysis_client_tests_maps_faults_to_transport_error() {
    let transport = common::ScriptedTransport::failing(TransportFault::Timeout);
    let client = common::client_for(transport.clone());

    let error = client
        .submit(common::fixture_request(Foot::Left))
        .await
        .expect_err("timeout should fail");

    assert!(matches!(
        error,
        AnalysisError::TransportError(TransportFault::Timeout)
    ));
    assert_eq!(error.kind(), FailureKind::Transport);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn analysis_client_tests_rejects_out_of_range_score_as_malformed() {
    let transport = common::ScriptedTransport::responding(
        200,
        r#"{"videoUrl":"v.mp4","score":140,"recommendations":[]}"#,
    );
    let client = common::client_for(transport);

    let error = client
        .submit(common::fixture_request(Foot::Right))
        .await
        .expect_err("out of range score should fail");

    assert_eq!(error.kind(), FailureKind::Malformed);
}

#[tokio::test]
async fn analysis_client_tests_maps_non_json_body_to_transport_error() {
    for body in ["not json", "", "<html>502 Bad Gateway</html>", r#"{"score":"#] {
        let transport = common::ScriptedTransport::responding(200, body);
        let client = common::client_for(transport);

        let error = client
            .submit(common::fixture_request(Foot::Right))
            .await
            .expect_err("unreadable body should fail");

        assert!(
            matches!(error, AnalysisError::TransportError(TransportFault::Body(_))),
            "body {body:?} gave {error:?}"
        );
        assert_eq!(error.kind(), FailureKind::Transport);
    }
}

#[tokio::test]
async fn analysis_client_tests_maps_json_missing_fields_to_malformed() {
    let transport = common::ScriptedTransport::responding(200, r#"{"videoUrl":"v.mp4"}"#);
    let client = common::client_for(transport);

    let error = client
        .submit(common::fixture_request(Foot::Right))
        .await
        .expect_err("incomplete body should fail");

    assert!(matches!(error, AnalysisError::MalformedResponse(_)));
}

#[tokio::test]
async fn analysis_client_tests_posts_to_configured_endpoint() {
    let transport = common::ScriptedTransport::responding(200, common::VALID_BODY);
    let client = common::client_for(transport.clone());

    client
        .submit(common::fixture_request(Foot::Left))
        .await
        .expect("analysis should succeed");

    let requests = transport.requests.lock().expect("request log lock");
    assert_eq!(requests[0].0.as_str(), "https://coach.example.test/get_stuff");
    assert_eq!(requests[0].1.foot(), Foot::Left);
}
