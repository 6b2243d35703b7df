//! Full stack against WES and Cromwell servers stood up with wiremock

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::TestApp;

#[tokio::test]
async fn test_wes_and_cromwell_environments_run_to_success() {
    let wes = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ga4gh/wes/v1/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"workflow_id": "wes-1"})))
        .expect(1)
        .mount(&wes)
        .await;
    Mock::given(method("GET"))
        .and(path("/ga4gh/wes/v1/workflows/wes-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "COMPLETE"})))
        .expect(1)
        .mount(&wes)
        .await;

    let cromwell = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/workflows/v1"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": "crom-1", "status": "Submitted"})),
        )
        .expect(1)
        .mount(&cromwell)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/workflows/v1/crom-1/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "crom-1", "status": "Succeeded"})),
        )
        .expect(1)
        .mount(&cromwell)
        .await;

    let app = TestApp::with_http_backends();
    app.register_environment("wes", &format!("{}/ga4gh/wes/v1", wes.uri()), "wes")
        .await;
    app.register_environment(
        "cromwell",
        &format!("{}/api/workflows/v1", cromwell.uri()),
        "cromwell",
    )
    .await;

    let test_id = app.submit_test().await;

    let (status, body) = app.status(&test_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "Succeeded");

    // Cached: the status endpoints above expect exactly one call each
    let (_, again) = app.status(&test_id).await;
    assert_eq!(again["state"], "Succeeded");
}

#[tokio::test]
async fn test_unreachable_environment_fails_submission() {
    let wes = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/workflows"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&wes)
        .await;

    let app = TestApp::with_http_backends();
    app.register_environment("down", &wes.uri(), "wes").await;

    let test_id = app.submit_test().await;
    let (_, body) = app.status(&test_id).await;

    assert_eq!(body["state"], "Failed");
    assert_eq!(body["environment_statuses"][0]["state"], "SubmissionFailed");
    assert_eq!(body["environment_statuses"][0]["run_id"], json!(null));
}
