//! API layer for the Portability domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::PortabilityState;
pub use routes::routes;
