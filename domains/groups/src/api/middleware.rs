//! Groups domain state and token verification wiring

use axum::extract::FromRef;
use fellowship_auth::TokenService;

use crate::service::{InviteWorkflow, MembershipManager};

/// Application state for the groups domain
#[derive(Clone)]
pub struct GroupsState {
    pub membership: MembershipManager,
    pub invites: InviteWorkflow,
    pub tokens: TokenService,
}

impl FromRef<GroupsState> for TokenService {
    fn from_ref(state: &GroupsState) -> Self {
        state.tokens.clone()
    }
}
