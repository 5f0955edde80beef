//! Group-level authorization
//!
//! Authentication happens at the edge (`AuthUser`); these checks run inside
//! a unit of work, after the group is locked and before any write.

use fellowship_auth::AccountId;
use fellowship_common::{Error, Result};
use uuid::Uuid;

use crate::domain::entities::{Member, Role};
use crate::repository::UnitOfWork;
use crate::service::storage_failure;

pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// The caller must be a member of the group, in any role
    pub async fn require_membership(
        uow: &mut dyn UnitOfWork,
        group_id: Uuid,
        account_id: AccountId,
    ) -> Result<Member> {
        uow.get_member(group_id, account_id)
            .await
            .map_err(storage_failure("load caller membership"))?
            .ok_or_else(|| Error::PermissionDenied("Not a member of this group".to_string()))
    }

    /// The caller's role must meet or exceed `role`
    pub async fn require_role(
        uow: &mut dyn UnitOfWork,
        group_id: Uuid,
        account_id: AccountId,
        role: Role,
    ) -> Result<Member> {
        let member = Self::require_membership(uow, group_id, account_id).await?;
        if !member.role.satisfies(role) {
            tracing::debug!(
                group_id = %group_id,
                account_id = %account_id,
                required = %role,
                actual = %member.role,
                "Role check failed"
            );
            return Err(Error::PermissionDenied(format!(
                "This operation requires the {} role",
                role
            )));
        }
        Ok(member)
    }
}
