//! Route definitions for Portability domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::portability_tests;
use super::middleware::PortabilityState;

/// Create all Portability domain API routes
pub fn routes() -> Router<PortabilityState> {
    Router::new()
        .route(
            "/v1/portability_tests",
            post(portability_tests::submit_portability_test),
        )
        .route(
            "/v1/portability_tests/{test_id}/status",
            get(portability_tests::get_portability_test_status),
        )
}
