//! HTTP handlers for the groups domain

pub mod groups;
pub mod invites;
pub mod members;
