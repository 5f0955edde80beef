//! API layer for the groups domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::GroupsState;
pub use routes::routes;
