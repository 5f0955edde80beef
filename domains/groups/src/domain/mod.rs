//! Groups domain layer: entities, invite state machine, admin continuity, authorization

pub mod continuity;
pub mod entities;
pub mod guard;
pub mod state;
