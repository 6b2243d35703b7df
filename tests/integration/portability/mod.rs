//! Portability test fan-out and status over HTTP

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use wfport_backends::mock::{MockPollOutcome, MockSubmitOutcome};

use crate::common::TestApp;

#[tokio::test]
async fn test_partial_submission_failure() {
    let app = TestApp::with_mock_backend();
    let env_a = app
        .register_scripted("env-a", MockSubmitOutcome::Accept("run-123".to_string()))
        .await;
    let env_b = app
        .register_scripted(
            "env-b",
            MockSubmitOutcome::Reject("connection refused".to_string()),
        )
        .await;

    let test_id = app.submit_test().await;
    let (status, body) = app.status(&test_id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "Failed");

    let mut expected = vec![
        json!({"environment_id": env_a, "run_id": "run-123", "state": "JobRunning"}),
        json!({"environment_id": env_b, "run_id": null, "state": "SubmissionFailed"}),
    ];
    expected.sort_by(|a, b| {
        a["environment_id"]
            .as_str()
            .cmp(&b["environment_id"].as_str())
    });
    assert_eq!(body["environment_statuses"], json!(expected));
}

#[tokio::test]
async fn test_submission_carries_payload_to_every_environment() {
    let app = TestApp::with_mock_backend();
    for name in ["one", "two", "three"] {
        app.register_environment(name, &format!("https://{}.example.org", name), "wes")
            .await;
    }

    app.submit_test().await;

    let submissions = app.backend.recorded_submissions();
    assert_eq!(submissions.len(), 3);
    for submission in submissions {
        assert_eq!(submission.payload.workflow_dependencies.len(), 1);
        assert_eq!(
            submission.payload.workflow_params,
            json!({"hello.say.name": "world"})
        );
    }
}

#[tokio::test]
async fn test_job_runs_to_success_and_is_cached() {
    let app = TestApp::with_mock_backend();
    let env = app
        .register_scripted("solo", MockSubmitOutcome::Accept("run-1".to_string()))
        .await;
    app.backend
        .behavior()
        .push_statuses("run-1", &["Running", "Succeeded"]);

    let test_id = app.submit_test().await;

    let (_, first) = app.status(&test_id).await;
    assert_eq!(first["state"], "Running");
    assert_eq!(first["environment_statuses"][0]["state"], "JobRunning");

    let (_, second) = app.status(&test_id).await;
    assert_eq!(second["state"], "Succeeded");
    assert_eq!(app.backend.poll_count(&env), 2);

    let (_, third) = app.status(&test_id).await;
    assert_eq!(third["state"], "Succeeded");
    assert_eq!(third["environment_statuses"][0]["state"], "JobSucceeded");
    assert_eq!(third["environment_statuses"][0]["run_id"], "run-1");
    assert_eq!(app.backend.poll_count(&env), 2);
}

#[tokio::test]
async fn test_zero_environments_succeed_immediately() {
    let app = TestApp::with_mock_backend();
    let test_id = app.submit_test().await;

    let (status, body) = app.status(&test_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"state": "Succeeded", "environment_statuses": []})
    );
}

#[tokio::test]
async fn test_poll_failure_is_reported_as_running() {
    let app = TestApp::with_mock_backend();
    app.register_scripted("flaky", MockSubmitOutcome::Accept("run-f".to_string()))
        .await;
    app.backend.behavior().push_poll_outcomes(
        "run-f",
        [
            MockPollOutcome::Fail("connection reset".to_string()),
            MockPollOutcome::Status("Failed".to_string()),
        ],
    );

    let test_id = app.submit_test().await;

    let (_, first) = app.status(&test_id).await;
    assert_eq!(first["state"], "Running");

    let (_, second) = app.status(&test_id).await;
    assert_eq!(second["state"], "Failed");
    assert_eq!(second["environment_statuses"][0]["state"], "JobFailed");
}

#[tokio::test]
async fn test_unmapped_status_is_bad_gateway() {
    let app = TestApp::with_mock_backend();
    app.register_scripted("odd", MockSubmitOutcome::Accept("run-x".to_string()))
        .await;
    app.backend.behavior().push_statuses("run-x", &["Exploded"]);

    let test_id = app.submit_test().await;
    let (status, body) = app.status(&test_id).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UNMAPPED_STATUS");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Exploded"));
}

#[tokio::test]
async fn test_unknown_test_is_not_found() {
    let app = TestApp::with_mock_backend();

    let (status, body) = app.status(&Uuid::new_v4().to_string()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = app.status("not-a-test-id").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_submission_is_rejected() {
    let app = TestApp::with_mock_backend();
    app.register_environment("wes", "https://wes.example.org", "wes")
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            "/v1/portability_tests",
            Some(json!({"workflow_descriptor": "", "workflow_params": {}})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(app.backend.recorded_submissions().is_empty());
}

#[tokio::test]
async fn test_environments_registered_after_submission_do_not_join() {
    let app = TestApp::with_mock_backend();
    app.register_scripted("early", MockSubmitOutcome::Accept("run-e".to_string()))
        .await;
    app.backend.behavior().push_statuses("run-e", &["Succeeded"]);

    let test_id = app.submit_test().await;
    app.register_environment("late", "https://late.example.org", "wes")
        .await;

    let (_, body) = app.status(&test_id).await;
    assert_eq!(body["state"], "Succeeded");
    assert_eq!(body["environment_statuses"].as_array().unwrap().len(), 1);
}
