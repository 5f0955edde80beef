//! Admin continuity rules
//!
//! Every group with at least one member must have at least one admin between
//! operations. These helpers operate on a full member snapshot taken while
//! the group is locked.

use crate::domain::entities::{Member, Role};

pub fn admin_count(members: &[Member]) -> usize {
    members.iter().filter(|m| m.is_admin()).count()
}

/// True when the snapshot is empty or has at least one admin
pub fn holds(members: &[Member]) -> bool {
    members.is_empty() || admin_count(members) > 0
}

/// Member to promote after the last admin left: earliest `created_at`,
/// then smallest id. `None` when no promotion is needed.
pub fn successor(remaining: &[Member]) -> Option<&Member> {
    if admin_count(remaining) > 0 {
        return None;
    }
    remaining.iter().min_by_key(|m| m.seniority())
}

/// Whether changing `target` to `new_role` would leave the group adminless
pub fn demotion_breaks_continuity(members: &[Member], target: &Member, new_role: Role) -> bool {
    target.is_admin() && !new_role.is_admin() && admin_count(members) <= 1
}
