use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use fieldrisk_analysis_client::AnalysisClient;
use fieldrisk_core::FieldRecord;
use fieldrisk_recon::{AnalysisError, Session, SourceFile, Transition, UNEXPECTED_SHAPE_MESSAGE};

const HOOK: &str = "/webhook/field-analysis";

fn client(server: &MockServer) -> AnalysisClient {
    AnalysisClient::new(server.url(HOOK), Some(Duration::from_secs(5))).unwrap()
}

fn north_lot() -> FieldRecord {
    FieldRecord {
        field_id: "1".into(),
        field_name: "North Lot".into(),
        crop: "Corn".into(),
        ..Default::default()
    }
}

fn session_with(records: Vec<FieldRecord>) -> Session {
    let mut session = Session::new();
    session.apply(Transition::FileSelected(Some(SourceFile::from_path("fields.csv")))).unwrap();
    session.apply(Transition::ParseComplete(records)).unwrap();
    session
}

#[test]
fn posts_the_batch_as_one_json_array() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(HOOK)
            .header("content-type", "application/json")
            .json_body(json!([{
                "field_id": "1",
                "field_name": "North Lot",
                "location": "",
                "crop": "Corn",
                "soil_moisture": "",
                "vigor_index": "",
                "yield_history": "",
                "pest_pressure": ""
            }]));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([{
                "field_id": "1",
                "field_name": "North Lot",
                "crop": "Corn",
                "risk_level": "High",
                "risk_score": 82,
                "advice": "Irrigate within 48h"
            }]));
    });

    let mut session = session_with(vec![north_lot()]);
    session.run(&client(&server)).unwrap();

    mock.assert();
    assert_eq!(session.selection_id(), "1");
    assert_eq!(session.selected_advice().as_deref(), Some("Irrigate within 48h"));
}

#[test]
fn fields_wrapper_is_accepted() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(HOOK);
        then.status(200).json_body(json!({
            "fields": [
                {"field_id": 7, "risk_level": "Low"},
                {"field_id": 8, "risk_level": "Moderate"}
            ]
        }));
    });

    let mut session = session_with(vec![north_lot()]);
    session.run(&client(&server)).unwrap();

    assert_eq!(session.results().len(), 2);
    assert_eq!(session.selection_id(), "7");
    assert_eq!(session.risk_tally().moderate, 1);
}

#[test]
fn non_success_status_surfaces_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(HOOK);
        then.status(500).body("workflow crashed");
    });

    let mut session = session_with(vec![north_lot()]);
    let err = session.run(&client(&server)).unwrap_err();

    assert_eq!(err, AnalysisError::Remote { status: Some(500), message: "workflow crashed".into() });
    assert!(!session.has_results());
}

#[test]
fn non_success_status_without_body_uses_generic_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(HOOK);
        then.status(404);
    });

    let mut session = session_with(vec![north_lot()]);
    let err = session.run(&client(&server)).unwrap_err();
    assert_eq!(err.message(), "Request failed with status 404");
}

#[test]
fn non_json_success_body_is_a_shape_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(HOOK);
        then.status(200).body("Workflow was started");
    });

    let mut session = session_with(vec![north_lot()]);
    let err = session.run(&client(&server)).unwrap_err();

    assert_eq!(err.kind(), "response_shape_error");
    assert_eq!(err.message(), "Workflow was started");
}

#[test]
fn json_of_the_wrong_shape_is_a_shape_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(HOOK);
        then.status(200).json_body(json!({"message": "Workflow was started"}));
    });

    let mut session = session_with(vec![north_lot()]);
    let err = session.run(&client(&server)).unwrap_err();

    assert_eq!(err.message(), UNEXPECTED_SHAPE_MESSAGE);
    assert!(err.raw_response().unwrap().contains("Workflow was started"));
}

#[test]
fn unreachable_service_is_a_network_error() {
    // Nothing listens on the discard port
    let client = AnalysisClient::new("http://127.0.0.1:9/hook".into(), Some(Duration::from_secs(2))).unwrap();

    let mut session = session_with(vec![north_lot()]);
    let err = session.run(&client).unwrap_err();

    assert!(matches!(err, AnalysisError::Remote { status: None, .. }));
    assert!(!session.is_loading());
}

#[test]
fn slow_service_hits_the_timeout() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(HOOK);
        then.status(200).delay(Duration::from_secs(3)).json_body(json!([]));
    });

    let client = AnalysisClient::new(server.url(HOOK), Some(Duration::from_millis(300))).unwrap();
    let err = session_with(vec![north_lot()]).run(&client).unwrap_err();

    assert!(matches!(err, AnalysisError::Remote { status: None, .. }));
}
