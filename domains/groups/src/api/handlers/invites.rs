//! Invite API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use fellowship_auth::{AccountId, AuthUser};
use fellowship_common::{Pagination, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::members::MemberResponse;
use crate::api::middleware::GroupsState;
use crate::{Invite, InviteFilter, InviteState};

#[derive(Debug, Deserialize, Validate)]
pub struct SendInviteRequest {
    pub group_id: Uuid,
    pub recipient_account_id: AccountId,
}

/// Filter and window for `GET /v1/invites`; filters are AND-combined
#[derive(Debug, Default, Deserialize)]
pub struct ListInvitesQuery {
    pub sender: Option<AccountId>,
    pub recipient: Option<AccountId>,
    pub group: Option<Uuid>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl ListInvitesQuery {
    fn filter(&self) -> InviteFilter {
        InviteFilter {
            sender: self.sender,
            recipient: self.recipient,
            group: self.group,
        }
    }

    fn pagination(&self) -> Pagination {
        Pagination {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InviteResponse {
    pub id: Uuid,
    pub group_id: Uuid,
    pub sender_account_id: AccountId,
    pub recipient_account_id: AccountId,
    pub state: InviteState,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Invite> for InviteResponse {
    fn from(invite: Invite) -> Self {
        Self {
            state: invite.state(),
            id: invite.id,
            group_id: invite.group_id,
            sender_account_id: invite.sender_account_id,
            recipient_account_id: invite.recipient_account_id,
            created_at: invite.created_at,
        }
    }
}

/// **POST /v1/invites**
///
/// The caller must be a member of the target group.
pub async fn send_invite(
    AuthUser(caller): AuthUser,
    State(state): State<GroupsState>,
    ValidatedJson(request): ValidatedJson<SendInviteRequest>,
) -> Result<(StatusCode, Json<InviteResponse>)> {
    let invite = state
        .invites
        .send_invite(request.group_id, request.recipient_account_id, caller)
        .await?;
    Ok((StatusCode::CREATED, Json(invite.into())))
}

/// **GET /v1/invites**
pub async fn list_invites(
    AuthUser(_caller): AuthUser,
    State(state): State<GroupsState>,
    Query(query): Query<ListInvitesQuery>,
) -> Result<Json<Vec<InviteResponse>>> {
    let invites = state
        .invites
        .list_invites(query.filter(), query.pagination().page())
        .await?;
    Ok(Json(invites.into_iter().map(Into::into).collect()))
}

/// **GET /v1/invites/{invite_id}**
pub async fn get_invite(
    AuthUser(_caller): AuthUser,
    State(state): State<GroupsState>,
    Path(invite_id): Path<Uuid>,
) -> Result<Json<InviteResponse>> {
    let invite = state.invites.get_invite(invite_id).await?;
    Ok(Json(invite.into()))
}

/// **POST /v1/invites/{invite_id}/accept** (recipient)
pub async fn accept_invite(
    AuthUser(caller): AuthUser,
    State(state): State<GroupsState>,
    Path(invite_id): Path<Uuid>,
) -> Result<Json<MemberResponse>> {
    let member = state.invites.accept_invite(invite_id, caller).await?;
    Ok(Json(member.into()))
}

/// **POST /v1/invites/{invite_id}/deny** (recipient)
pub async fn deny_invite(
    AuthUser(caller): AuthUser,
    State(state): State<GroupsState>,
    Path(invite_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.invites.deny_invite(invite_id, caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// **DELETE /v1/invites/{invite_id}** (Admin of the invite's group)
pub async fn revoke_invite(
    AuthUser(caller): AuthUser,
    State(state): State<GroupsState>,
    Path(invite_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.invites.revoke_invite(invite_id, caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
