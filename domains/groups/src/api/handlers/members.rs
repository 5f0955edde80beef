//! Group membership API handlers

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

use crate::api::middleware::GroupsState;
use crate::{Member, Role};

#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    pub account_id: AccountId,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMemberRoleRequest {
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    pub id: Uuid,
    pub group_id: Uuid,
    pub account_id: AccountId,
    pub role: Role,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            group_id: member.group_id,
            account_id: member.account_id,
            role: member.role,
            created_at: member.created_at,
        }
    }
}

/// **POST /v1/groups/{group_id}/members**
///
/// Any member may add another account; it joins with the User role.
pub async fn add_member(
    AuthUser(caller): AuthUser,
    State(state): State<GroupsState>,
    Path(group_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>)> {
    let member = state
        .membership
        .add_member(group_id, request.account_id, caller)
        .await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

/// **GET /v1/groups/{group_id}/members**
pub async fn list_members(
    AuthUser(_caller): AuthUser,
    State(state): State<GroupsState>,
    Path(group_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<MemberResponse>>> {
    let members = state
        .membership
        .list_members(group_id, pagination.page())
        .await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// **GET /v1/groups/{group_id}/members/{account_id}**
pub async fn get_member(
    AuthUser(_caller): AuthUser,
    State(state): State<GroupsState>,
    Path((group_id, account_id)): Path<(Uuid, AccountId)>,
) -> Result<Json<MemberResponse>> {
    let member = state.membership.get_member(group_id, account_id).await?;
    Ok(Json(member.into()))
}

/// **PATCH /v1/groups/{group_id}/members/{account_id}** (Admin)
pub async fn update_member_role(
    AuthUser(caller): AuthUser,
    State(state): State<GroupsState>,
    Path((group_id, account_id)): Path<(Uuid, AccountId)>,
    ValidatedJson(request): ValidatedJson<UpdateMemberRoleRequest>,
) -> Result<Json<MemberResponse>> {
    let member = state
        .membership
        .update_member_role(group_id, account_id, request.role, caller)
        .await?;
    Ok(Json(member.into()))
}

/// **DELETE /v1/groups/{group_id}/members/{account_id}**
///
/// Members may always remove themselves; removing anyone else needs Admin.
pub async fn remove_member(
    AuthUser(caller): AuthUser,
    State(state): State<GroupsState>,
    Path((group_id, account_id)): Path<(Uuid, AccountId)>,
) -> Result<StatusCode> {
    state
        .membership
        .remove_member(group_id, account_id, caller)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
