//! API layer for the Environments domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::EnvironmentsState;
pub use routes::routes;
