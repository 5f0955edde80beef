//! API endpoint integration tests
//!
//! Tests for all groups-domain API endpoints: groups, members, invites, auth, invariants.

#![allow(dead_code)]

mod auth;
mod common;
mod groups;
mod invariants;
mod invites;
mod members;
