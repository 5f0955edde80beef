//! Groups domain: groups, members, invites, and the storage they live in

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::guard::AuthorizationGuard;
pub use domain::state::{InviteEvent, InviteState, InviteStateMachine};

// Re-export storage and service types
pub use repository::{MemoryStore, PgStore, Store, UnitOfWork};
pub use service::{InviteWorkflow, MembershipManager, RemovalOutcome};

// Re-export API types
pub use api::routes;
pub use api::GroupsState;
