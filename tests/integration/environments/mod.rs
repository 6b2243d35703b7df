//! Environment registration over HTTP

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::with_mock_backend();
    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
}

#[tokio::test]
async fn test_register_and_list_environments() {
    let app = TestApp::with_mock_backend();
    let (status, body) = app
        .send(
            Method::POST,
            "/v1/environments",
            Some(json!({
                "name": "papi cromwell",
                "url": "https://cromwell.example.org/api/workflows/v1",
                "schema": "cromwell",
                "headers": {"Authorization": "Bearer s3cret"},
                "tags": {"project": "hca"}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let environment_id = body["environment_id"].as_str().unwrap().to_string();

    app.register_environment("dnanexus", "https://dx-wes.example.org", "wes")
        .await;

    let (status, body) = app.send(Method::GET, "/v1/environments", None).await;
    assert_eq!(status, StatusCode::OK);
    let environments = body["environments"].as_array().unwrap();
    assert_eq!(environments.len(), 2);
    assert_eq!(environments[0]["environment_id"], environment_id);
    assert_eq!(environments[0]["schema"], "cromwell");
    assert_eq!(environments[0]["tags"]["project"], "hca");
    assert!(environments[0].get("headers").is_none());
    assert_eq!(environments[1]["name"], "dnanexus");
}

#[tokio::test]
async fn test_schema_defaults_to_wes() {
    let app = TestApp::with_mock_backend();
    app.send(
        Method::POST,
        "/v1/environments",
        Some(json!({"name": "wes", "url": "https://wes.example.org"})),
    )
    .await;

    let (_, body) = app.send(Method::GET, "/v1/environments", None).await;
    assert_eq!(body["environments"][0]["schema"], "wes");
}

#[tokio::test]
async fn test_invalid_registration_is_rejected() {
    let app = TestApp::with_mock_backend();

    for body in [
        json!({"name": "", "url": "https://wes.example.org"}),
        json!({"name": "bad url", "url": "not a url"}),
        json!({"name": "bad scheme", "url": "ftp://wes.example.org"}),
        json!({"name": "bad schema", "url": "https://wes.example.org", "schema": "slurm"}),
        json!({"url": "https://wes.example.org"}),
    ] {
        let (status, response) = app
            .send(Method::POST, "/v1/environments", Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {}", body);
        assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
    }

    let (_, body) = app.send(Method::GET, "/v1/environments", None).await;
    assert!(body["environments"].as_array().unwrap().is_empty());
}
