//! Group and membership management
//!
//! Mutations lock the group first, authorize the caller, then read and write
//! members inside the same unit of work. Every non-empty group keeps at
//! least one admin between operations.

use std::sync::Arc;
use std::time::Duration;

use fellowship_auth::AccountId;
use fellowship_common::{Error, Page, RepositoryError, Result};
use uuid::Uuid;

use super::{begin, commit, storage_failure, with_deadline};
use crate::domain::continuity;
use crate::domain::entities::{Group, Member, Role};
use crate::domain::guard::AuthorizationGuard;
use crate::repository::{Store, UnitOfWork};

/// Result of a member removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub removed: Member,
    /// Member promoted to admin because the last admin left
    pub promoted: Option<Member>,
}

#[derive(Clone)]
pub struct MembershipManager {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl MembershipManager {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Create a group with `creator` as its only member and admin
    pub async fn create_group(
        &self,
        name: String,
        description: String,
        creator: AccountId,
    ) -> Result<(Group, Member)> {
        with_deadline(self.timeout, "create_group", async {
            let mut uow = begin(self.store.as_ref()).await?;

            let group = uow
                .create_group(&Group::new(name, description))
                .await
                .map_err(storage_failure("create group"))?;

            // Dropping the unit of work on failure discards the group as well
            let admin = uow
                .create_member(&Member::new(group.id, creator, Role::Admin))
                .await
                .map_err(|err| match err {
                    RepositoryError::NotFound => Error::NotFound("Account not found".to_string()),
                    other => storage_failure("create group admin")(other),
                })?;

            commit(uow.as_mut()).await?;

            tracing::info!(group_id = %group.id, creator = %creator, "Group created");
            Ok((group, admin))
        })
        .await
    }

    pub async fn get_group(&self, group_id: Uuid) -> Result<Group> {
        with_deadline(self.timeout, "get_group", async {
            let mut uow = begin(self.store.as_ref()).await?;
            uow.get_group(group_id)
                .await
                .map_err(storage_failure("load group"))?
                .ok_or_else(group_not_found)
        })
        .await
    }

    pub async fn list_groups(&self, page: Page) -> Result<Vec<Group>> {
        with_deadline(self.timeout, "list_groups", async {
            let mut uow = begin(self.store.as_ref()).await?;
            uow.list_groups(page)
                .await
                .map_err(storage_failure("list groups"))
        })
        .await
    }

    /// Admin only. `None` fields are left unchanged.
    pub async fn update_group(
        &self,
        group_id: Uuid,
        name: Option<String>,
        description: Option<String>,
        actor: AccountId,
    ) -> Result<Group> {
        with_deadline(self.timeout, "update_group", async {
            let mut uow = begin(self.store.as_ref()).await?;
            let mut group = lock_existing_group(uow.as_mut(), group_id).await?;
            AuthorizationGuard::require_role(uow.as_mut(), group_id, actor, Role::Admin).await?;

            group.apply_update(name, description);
            let group = uow
                .update_group(&group)
                .await
                .map_err(storage_failure("update group"))?;

            commit(uow.as_mut()).await?;
            Ok(group)
        })
        .await
    }

    /// Admin only. Removes the group with all of its members and invites.
    pub async fn delete_group(&self, group_id: Uuid, actor: AccountId) -> Result<()> {
        with_deadline(self.timeout, "delete_group", async {
            let mut uow = begin(self.store.as_ref()).await?;
            lock_existing_group(uow.as_mut(), group_id).await?;
            AuthorizationGuard::require_role(uow.as_mut(), group_id, actor, Role::Admin).await?;

            let invites = uow
                .delete_invites_for_group(group_id)
                .await
                .map_err(storage_failure("delete group invites"))?;
            let members = uow
                .delete_members_for_group(group_id)
                .await
                .map_err(storage_failure("delete group members"))?;
            uow.delete_group(group_id)
                .await
                .map_err(storage_failure("delete group"))?;

            commit(uow.as_mut()).await?;

            tracing::info!(
                group_id = %group_id,
                actor = %actor,
                members,
                invites,
                "Group deleted"
            );
            Ok(())
        })
        .await
    }

    /// Any member may add an account; the new member gets the User role
    pub async fn add_member(
        &self,
        group_id: Uuid,
        account_id: AccountId,
        actor: AccountId,
    ) -> Result<Member> {
        with_deadline(self.timeout, "add_member", async {
            let mut uow = begin(self.store.as_ref()).await?;
            lock_existing_group(uow.as_mut(), group_id).await?;
            AuthorizationGuard::require_membership(uow.as_mut(), group_id, actor).await?;

            let member = Self::join(uow.as_mut(), group_id, account_id).await?;

            commit(uow.as_mut()).await?;
            tracing::info!(group_id = %group_id, account_id = %account_id, actor = %actor, "Member added");
            Ok(member)
        })
        .await
    }

    pub async fn get_member(&self, group_id: Uuid, account_id: AccountId) -> Result<Member> {
        with_deadline(self.timeout, "get_member", async {
            let mut uow = begin(self.store.as_ref()).await?;
            uow.get_member(group_id, account_id)
                .await
                .map_err(storage_failure("load member"))?
                .ok_or_else(member_not_found)
        })
        .await
    }

    pub async fn list_members(&self, group_id: Uuid, page: Page) -> Result<Vec<Member>> {
        with_deadline(self.timeout, "list_members", async {
            let mut uow = begin(self.store.as_ref()).await?;
            uow.get_group(group_id)
                .await
                .map_err(storage_failure("load group"))?
                .ok_or_else(group_not_found)?;
            uow.list_members(group_id, Some(page))
                .await
                .map_err(storage_failure("list members"))
        })
        .await
    }

    /// Remove `target` from the group.
    ///
    /// Leaving is always allowed; removing someone else needs Admin. When the
    /// last admin goes and members remain, the most senior remaining member
    /// is promoted in the same unit of work.
    pub async fn remove_member(
        &self,
        group_id: Uuid,
        target: AccountId,
        actor: AccountId,
    ) -> Result<RemovalOutcome> {
        with_deadline(self.timeout, "remove_member", async {
            let mut uow = begin(self.store.as_ref()).await?;
            lock_existing_group(uow.as_mut(), group_id).await?;

            if actor != target {
                AuthorizationGuard::require_role(uow.as_mut(), group_id, actor, Role::Admin)
                    .await?;
            }

            let removed = uow
                .get_member(group_id, target)
                .await
                .map_err(storage_failure("load member"))?
                .ok_or_else(member_not_found)?;

            uow.delete_member(removed.id)
                .await
                .map_err(storage_failure("delete member"))?;

            let mut promoted = None;
            if removed.is_admin() {
                let remaining = uow
                    .list_members(group_id, None)
                    .await
                    .map_err(storage_failure("list remaining members"))?;

                if let Some(successor) = continuity::successor(&remaining) {
                    let member = uow
                        .update_member_role(successor.id, Role::Admin)
                        .await
                        .map_err(storage_failure("promote successor"))?;
                    promoted = Some(member);
                }
            }

            commit(uow.as_mut()).await?;

            tracing::info!(
                group_id = %group_id,
                target = %target,
                actor = %actor,
                "Member removed"
            );
            if let Some(member) = &promoted {
                tracing::info!(
                    group_id = %group_id,
                    account_id = %member.account_id,
                    "Promoted member to admin after last admin left"
                );
            }

            Ok(RemovalOutcome { removed, promoted })
        })
        .await
    }

    /// Admin only. Refuses to demote the group's last admin.
    pub async fn update_member_role(
        &self,
        group_id: Uuid,
        target: AccountId,
        role: Role,
        actor: AccountId,
    ) -> Result<Member> {
        with_deadline(self.timeout, "update_member_role", async {
            let mut uow = begin(self.store.as_ref()).await?;
            lock_existing_group(uow.as_mut(), group_id).await?;
            AuthorizationGuard::require_role(uow.as_mut(), group_id, actor, Role::Admin).await?;

            let member = uow
                .get_member(group_id, target)
                .await
                .map_err(storage_failure("load member"))?
                .ok_or_else(member_not_found)?;

            if member.role == role {
                return Ok(member);
            }

            let members = uow
                .list_members(group_id, None)
                .await
                .map_err(storage_failure("list members"))?;
            if continuity::demotion_breaks_continuity(&members, &member, role) {
                return Err(Error::FailedPrecondition(
                    "Cannot demote the last admin of the group".to_string(),
                ));
            }

            let member = uow
                .update_member_role(member.id, role)
                .await
                .map_err(storage_failure("update member role"))?;

            commit(uow.as_mut()).await?;

            tracing::info!(
                group_id = %group_id,
                target = %target,
                role = %role,
                actor = %actor,
                "Member role updated"
            );
            Ok(member)
        })
        .await
    }

    /// Insert `account_id` as a User member of an already locked group.
    ///
    /// Performs no authorization: callers decide who may join. Used by
    /// `add_member` and by invite acceptance, where the invite itself is the
    /// authorization.
    pub(crate) async fn join(
        uow: &mut dyn UnitOfWork,
        group_id: Uuid,
        account_id: AccountId,
    ) -> Result<Member> {
        uow.get_account(account_id)
            .await
            .map_err(storage_failure("load account"))?
            .ok_or_else(|| Error::NotFound("Account not found".to_string()))?;

        uow.create_member(&Member::new(group_id, account_id, Role::User))
            .await
            .map_err(|err| match err {
                RepositoryError::DuplicateKey => Error::AlreadyExists(
                    "Account is already a member of this group".to_string(),
                ),
                RepositoryError::NotFound => group_not_found(),
                other => storage_failure("create member")(other),
            })
    }
}

/// Lock the group for the rest of the unit of work
pub(crate) async fn lock_existing_group(uow: &mut dyn UnitOfWork, group_id: Uuid) -> Result<Group> {
    uow.lock_group(group_id)
        .await
        .map_err(storage_failure("lock group"))?
        .ok_or_else(group_not_found)
}

pub(crate) fn group_not_found() -> Error {
    Error::NotFound("Group not found".to_string())
}

fn member_not_found() -> Error {
    Error::NotFound("Member not found".to_string())
}
