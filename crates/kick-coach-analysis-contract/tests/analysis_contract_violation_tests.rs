//! Integration tests for analysis contract rejections.

use kick_coach_analysis_contract::{AnalysisContractError, parse_analysis_response};

fn assert_invalid_contract(raw: &str) {
    match parse_analysis_response(raw) {
        Err(AnalysisContractError::InvalidContract(_)) => {}
        other => panic!("expected contract violation, got {other:?}"),
    }
}

fn assert_decode_failure(raw: &str) {
    match parse_analysis_response(raw) {
        Err(AnalysisContractError::Decode(_)) => {}
        other => panic!("expected decode failure, got {other:?}"),
    }
}

#[test]
fn analysis_contract_violation_tests_rejects_out_of_range_scores() {
    assert_invalid_contract(r#"{"videoUrl":"v.mp4","score":101,"recommendations":[]}"#);
    assert_invalid_contract(r#"{"videoUrl":"v.mp4","score":-1,"recommendations":[]}"#);
}

#[test]
fn analysis_contract_violation_tests_rejects_duplicate_ids() {
    assert_invalid_contract(
        r#"{"videoUrl":"v.mp4","score":70,"recommendations":[
            {"id":"1","title":"a","description":"b"},
            {"id":"1","title":"c","description":"d"}
        ]}"#,
    );
}

#[test]
fn analysis_contract_violation_tests_rejects_missing_parts() {
    assert_invalid_contract(r#"{"score":70,"recommendations":[]}"#);
    assert_invalid_contract(r#"{"videoUrl":"  ","score":70,"recommendations":[]}"#);
    assert_invalid_contract(r#"{"videoUrl":"v.mp4","score":70}"#);
    assert_invalid_contract(r#"{"video":"not base64!","score":70,"recommendations":[]}"#);
}

#[test]
fn analysis_contract_violation_tests_rejects_undecodable_bodies() {
    assert_decode_failure("");
    assert_decode_failure("<html>502 Bad Gateway</html>");
    assert_decode_failure(r#"{"videoUrl":"v.mp4","recommendations":[]}"#);
    assert_decode_failure(r#"{"videoUrl":"v.mp4","score":"88","recommendations":[]}"#);
    assert_decode_failure(
        r#"{"videoUrl":"v.mp4","score":88,"recommendations":[{"id":"1","title":"a"}]}"#,
    );
}
