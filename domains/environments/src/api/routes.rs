//! Route definitions for Environments domain API

use axum::{routing::get, Router};

use super::handlers::environments;
use super::middleware::EnvironmentsState;

/// Create all Environments domain API routes
pub fn routes() -> Router<EnvironmentsState> {
    Router::new().route(
        "/v1/environments",
        get(environments::list_environments).post(environments::register_environment),
    )
}
