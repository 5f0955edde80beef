//! Group API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use fellowship_auth::AuthUser;
use fellowship_common::{Pagination, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::GroupsState;
use crate::Group;

/// Request for creating a new group
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
}

/// Request for updating a group; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

/// **POST /v1/groups**
///
/// The caller becomes the group's first member, with the Admin role.
pub async fn create_group(
    AuthUser(caller): AuthUser,
    State(state): State<GroupsState>,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>)> {
    let (group, _) = state
        .membership
        .create_group(request.name, request.description, caller)
        .await?;
    Ok((StatusCode::CREATED, Json(group.into())))
}

/// **GET /v1/groups**
pub async fn list_groups(
    AuthUser(_caller): AuthUser,
    State(state): State<GroupsState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<GroupResponse>>> {
    let groups = state.membership.list_groups(pagination.page()).await?;
    Ok(Json(groups.into_iter().map(Into::into).collect()))
}

/// **GET /v1/groups/{group_id}**
pub async fn get_group(
    AuthUser(_caller): AuthUser,
    State(state): State<GroupsState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupResponse>> {
    let group = state.membership.get_group(group_id).await?;
    Ok(Json(group.into()))
}

/// **PATCH /v1/groups/{group_id}** (Admin)
pub async fn update_group(
    AuthUser(caller): AuthUser,
    State(state): State<GroupsState>,
    Path(group_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateGroupRequest>,
) -> Result<Json<GroupResponse>> {
    let group = state
        .membership
        .update_group(group_id, request.name, request.description, caller)
        .await?;
    Ok(Json(group.into()))
}

/// **DELETE /v1/groups/{group_id}** (Admin)
///
/// Deletes the group together with its members and pending invites.
pub async fn delete_group(
    AuthUser(caller): AuthUser,
    State(state): State<GroupsState>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.membership.delete_group(group_id, caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
