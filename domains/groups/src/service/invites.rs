//! Invite workflow
//!
//! An invite is pending while its row exists. Accepting turns it into a
//! member and deletes it; denying or revoking just deletes it. Each
//! transition locks the invite's group first and re-reads the invite under
//! that lock, so two racing answers to the same invite cannot both succeed.

use std::sync::Arc;
use std::time::Duration;

use fellowship_auth::AccountId;
use fellowship_common::{Error, Page, RepositoryError, Result};
use uuid::Uuid;

use super::membership::{group_not_found, lock_existing_group};
use super::{begin, commit, storage_failure, with_deadline, MembershipManager};
use crate::domain::entities::{Invite, InviteFilter, Member, Role};
use crate::domain::guard::AuthorizationGuard;
use crate::domain::state::{InviteEvent, InviteStateMachine};
use crate::repository::{Store, UnitOfWork};

#[derive(Clone)]
pub struct InviteWorkflow {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl InviteWorkflow {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Any member of the group may invite an existing account that is not
    /// already a member
    pub async fn send_invite(
        &self,
        group_id: Uuid,
        recipient: AccountId,
        sender: AccountId,
    ) -> Result<Invite> {
        with_deadline(self.timeout, "send_invite", async {
            let mut uow = begin(self.store.as_ref()).await?;
            lock_existing_group(uow.as_mut(), group_id).await?;
            AuthorizationGuard::require_membership(uow.as_mut(), group_id, sender).await?;

            uow.get_account(recipient)
                .await
                .map_err(storage_failure("load recipient account"))?
                .ok_or_else(|| Error::NotFound("Recipient account not found".to_string()))?;

            let already_member = uow
                .get_member(group_id, recipient)
                .await
                .map_err(storage_failure("load recipient membership"))?
                .is_some();
            if already_member {
                return Err(Error::AlreadyExists(
                    "Recipient is already a member of this group".to_string(),
                ));
            }

            let invite = uow
                .create_invite(&Invite::new(group_id, sender, recipient))
                .await
                .map_err(|err| match err {
                    RepositoryError::DuplicateKey => Error::AlreadyExists(
                        "A pending invite for this recipient already exists".to_string(),
                    ),
                    RepositoryError::NotFound => group_not_found(),
                    other => storage_failure("create invite")(other),
                })?;

            commit(uow.as_mut()).await?;

            tracing::info!(
                invite_id = %invite.id,
                group_id = %group_id,
                sender = %sender,
                recipient = %recipient,
                "Invite sent"
            );
            Ok(invite)
        })
        .await
    }

    /// The recipient joins the group; the invite is consumed
    pub async fn accept_invite(&self, invite_id: Uuid, actor: AccountId) -> Result<Member> {
        with_deadline(self.timeout, "accept_invite", async {
            let mut uow = begin(self.store.as_ref()).await?;
            let invite = answerable_invite(uow.as_mut(), invite_id, actor).await?;
            let outcome = InviteStateMachine::transition(invite.state(), InviteEvent::Accept)?;

            // Joining first: if it fails the invite is left pending
            let member = MembershipManager::join(uow.as_mut(), invite.group_id, actor).await?;
            uow.delete_invite(invite.id)
                .await
                .map_err(storage_failure("delete accepted invite"))?;

            commit(uow.as_mut()).await?;

            tracing::info!(
                invite_id = %invite.id,
                group_id = %invite.group_id,
                account_id = %actor,
                state = %outcome,
                "Invite answered"
            );
            Ok(member)
        })
        .await
    }

    /// The recipient declines; no member is created
    pub async fn deny_invite(&self, invite_id: Uuid, actor: AccountId) -> Result<()> {
        with_deadline(self.timeout, "deny_invite", async {
            let mut uow = begin(self.store.as_ref()).await?;
            let invite = answerable_invite(uow.as_mut(), invite_id, actor).await?;
            let outcome = InviteStateMachine::transition(invite.state(), InviteEvent::Deny)?;

            uow.delete_invite(invite.id)
                .await
                .map_err(storage_failure("delete denied invite"))?;

            commit(uow.as_mut()).await?;

            tracing::info!(
                invite_id = %invite.id,
                group_id = %invite.group_id,
                account_id = %actor,
                state = %outcome,
                "Invite answered"
            );
            Ok(())
        })
        .await
    }

    /// An admin of the invite's group withdraws it
    pub async fn revoke_invite(&self, invite_id: Uuid, actor: AccountId) -> Result<()> {
        with_deadline(self.timeout, "revoke_invite", async {
            let mut uow = begin(self.store.as_ref()).await?;
            let invite = find_invite(uow.as_mut(), invite_id).await?;
            lock_existing_group(uow.as_mut(), invite.group_id).await?;
            AuthorizationGuard::require_role(uow.as_mut(), invite.group_id, actor, Role::Admin)
                .await?;

            uow.delete_invite(invite.id)
                .await
                .map_err(|err| match err {
                    RepositoryError::NotFound => invite_not_found(),
                    other => storage_failure("delete revoked invite")(other),
                })?;

            commit(uow.as_mut()).await?;

            tracing::info!(
                invite_id = %invite.id,
                group_id = %invite.group_id,
                actor = %actor,
                "Invite revoked"
            );
            Ok(())
        })
        .await
    }

    pub async fn get_invite(&self, invite_id: Uuid) -> Result<Invite> {
        with_deadline(self.timeout, "get_invite", async {
            let mut uow = begin(self.store.as_ref()).await?;
            find_invite(uow.as_mut(), invite_id).await
        })
        .await
    }

    pub async fn list_invites(&self, filter: InviteFilter, page: Page) -> Result<Vec<Invite>> {
        with_deadline(self.timeout, "list_invites", async {
            let mut uow = begin(self.store.as_ref()).await?;
            uow.list_invites(&filter, page)
                .await
                .map_err(storage_failure("list invites"))
        })
        .await
    }
}

async fn find_invite(uow: &mut dyn UnitOfWork, invite_id: Uuid) -> Result<Invite> {
    uow.get_invite(invite_id)
        .await
        .map_err(storage_failure("load invite"))?
        .ok_or_else(invite_not_found)
}

/// Load an invite the actor may answer, with its group locked
async fn answerable_invite(
    uow: &mut dyn UnitOfWork,
    invite_id: Uuid,
    actor: AccountId,
) -> Result<Invite> {
    let invite = find_invite(uow, invite_id).await?;
    if !invite.is_recipient(actor) {
        return Err(Error::PermissionDenied(
            "Only the recipient can answer this invite".to_string(),
        ));
    }

    lock_existing_group(uow, invite.group_id).await?;
    // Another answer may have consumed it while we waited for the lock
    find_invite(uow, invite_id).await
}

fn invite_not_found() -> Error {
    Error::NotFound("Invite not found".to_string())
}
