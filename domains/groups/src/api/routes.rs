//! Route definitions for the groups domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{groups, invites, members};
use super::middleware::GroupsState;

/// Group CRUD routes
fn group_routes() -> Router<GroupsState> {
    Router::new()
        .route(
            "/v1/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route(
            "/v1/groups/{group_id}",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
}

/// Group membership routes
fn member_routes() -> Router<GroupsState> {
    Router::new()
        .route(
            "/v1/groups/{group_id}/members",
            get(members::list_members).post(members::add_member),
        )
        .route(
            "/v1/groups/{group_id}/members/{account_id}",
            get(members::get_member)
                .patch(members::update_member_role)
                .delete(members::remove_member),
        )
}

/// Invite routes
fn invite_routes() -> Router<GroupsState> {
    Router::new()
        .route(
            "/v1/invites",
            get(invites::list_invites).post(invites::send_invite),
        )
        .route(
            "/v1/invites/{invite_id}",
            get(invites::get_invite).delete(invites::revoke_invite),
        )
        .route(
            "/v1/invites/{invite_id}/accept",
            post(invites::accept_invite),
        )
        .route("/v1/invites/{invite_id}/deny", post(invites::deny_invite))
}

/// Create all groups domain API routes
pub fn routes() -> Router<GroupsState> {
    Router::new()
        .merge(group_routes())
        .merge(member_routes())
        .merge(invite_routes())
}
