//! Common test utilities for integration tests
//!
//! Builds the full application router over in-memory stores, with either the
//! programmable mock backend or the real HTTP adapters.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use wfport_app::{build_router, Stores};
use wfport_backends::mock::{MockBackend, MockSubmitOutcome};
use wfport_backends::{
    BackendConfig, BackendRegistry, BackendRegistryFactory, WorkflowBackend, WorkflowSchema,
};

/// Test application over in-memory stores
pub struct TestApp {
    router: Router,
    pub backend: MockBackend,
}

impl TestApp {
    /// Application whose every schema is served by one shared mock backend
    pub fn with_mock_backend() -> Self {
        let backend = MockBackend::new();
        let shared: std::sync::Arc<dyn WorkflowBackend> = std::sync::Arc::new(backend.clone());
        let registry = BackendRegistry::new()
            .with_backend(WorkflowSchema::Wes, shared.clone())
            .with_backend(WorkflowSchema::Cromwell, shared);
        Self {
            router: build_router(Stores::in_memory(), registry, None),
            backend,
        }
    }

    /// Application using the real WES and Cromwell HTTP clients
    pub fn with_http_backends() -> Self {
        let registry = BackendRegistryFactory::create(BackendConfig {
            provider: "http".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        Self {
            router: build_router(Stores::in_memory(), registry, None),
            backend: MockBackend::new(),
        }
    }

    pub fn test_router(&self) -> Router {
        self.router.clone()
    }

    /// Send a request and return the status with the parsed JSON body
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self
            .test_router()
            .oneshot(request(method, uri, body))
            .await
            .unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    /// Register an environment and return its generated id
    pub async fn register_environment(&self, name: &str, url: &str, schema: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/v1/environments",
                Some(json!({"name": name, "url": url, "schema": schema})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["environment_id"].as_str().unwrap().to_string()
    }

    /// Register an environment whose mock submission yields the given outcome
    pub async fn register_scripted(&self, name: &str, outcome: MockSubmitOutcome) -> String {
        let id = self
            .register_environment(name, &format!("https://{}.example.org", name), "cromwell")
            .await;
        self.backend.behavior().set_submit_outcome(&id, outcome);
        id
    }

    /// Submit the sample workflow, returning the new test id
    pub async fn submit_test(&self) -> String {
        let (status, body) = self
            .send(Method::POST, "/v1/portability_tests", Some(sample_workflow()))
            .await;
        assert_eq!(status, StatusCode::CREATED, "submit failed: {}", body);
        body["test_id"].as_str().unwrap().to_string()
    }

    pub async fn status(&self, test_id: &str) -> (StatusCode, Value) {
        self.send(
            Method::GET,
            &format!("/v1/portability_tests/{}/status", test_id),
            None,
        )
        .await
    }
}

pub fn sample_workflow() -> Value {
    json!({
        "workflow_descriptor": "import \"tasks.wdl\" as t\nworkflow hello { call t.say }",
        "workflow_params": {"hello.say.name": "world"},
        "workflow_dependencies": [{"name": "tasks.wdl", "code": "task say { command { echo hi } }"}]
    })
}

pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    if let Some(b) = body {
        builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    }
}

/// Parse a response body as JSON, falling back to a string for plain text
pub async fn parse_body(response: axum::http::Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
}
