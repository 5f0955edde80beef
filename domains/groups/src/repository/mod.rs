//! Storage contract for the groups domain
//!
//! A [`Store`] hands out [`UnitOfWork`]s. Everything done through one unit of
//! work becomes visible atomically on [`UnitOfWork::commit`]; dropping it
//! without committing discards every change.
//!
//! Membership decisions first call [`UnitOfWork::lock_group`], which holds
//! the group exclusively until the unit of work ends. Lock order is always
//! group, then invites.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use fellowship_auth::AccountId;
use fellowship_common::{Page, RepositoryError};
use uuid::Uuid;

use crate::domain::entities::{Account, Group, Invite, InviteFilter, Member, Role};

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Open a new unit of work
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError>;
}

#[async_trait::async_trait]
pub trait UnitOfWork: Send {
    // ───────────────────────────── Accounts ─────────────────────────────

    /// Accounts are owned elsewhere; this domain only checks they exist.
    async fn get_account(&mut self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    // ───────────────────────────── Groups ──────────────────────────────

    async fn create_group(&mut self, group: &Group) -> Result<Group, RepositoryError>;

    async fn get_group(&mut self, id: Uuid) -> Result<Option<Group>, RepositoryError>;

    /// Read the group and hold it exclusively until this unit of work ends.
    async fn lock_group(&mut self, id: Uuid) -> Result<Option<Group>, RepositoryError>;

    /// `NotFound` if the group does not exist
    async fn update_group(&mut self, group: &Group) -> Result<Group, RepositoryError>;

    /// `NotFound` if the group does not exist
    async fn delete_group(&mut self, id: Uuid) -> Result<(), RepositoryError>;

    /// Ordered by (created_at, id)
    async fn list_groups(&mut self, page: Page) -> Result<Vec<Group>, RepositoryError>;

    // ───────────────────────────── Members ─────────────────────────────

    /// `DuplicateKey` if the account is already a member; `NotFound` if the
    /// group or account does not exist
    async fn create_member(&mut self, member: &Member) -> Result<Member, RepositoryError>;

    async fn get_member(
        &mut self,
        group_id: Uuid,
        account_id: AccountId,
    ) -> Result<Option<Member>, RepositoryError>;

    /// `NotFound` if the member does not exist
    async fn update_member_role(
        &mut self,
        member_id: Uuid,
        role: Role,
    ) -> Result<Member, RepositoryError>;

    /// `NotFound` if the member does not exist
    async fn delete_member(&mut self, member_id: Uuid) -> Result<(), RepositoryError>;

    /// Ordered by (created_at, id). `None` returns every member.
    async fn list_members(
        &mut self,
        group_id: Uuid,
        page: Option<Page>,
    ) -> Result<Vec<Member>, RepositoryError>;

    async fn delete_members_for_group(&mut self, group_id: Uuid) -> Result<u64, RepositoryError>;

    // ───────────────────────────── Invites ─────────────────────────────

    /// `DuplicateKey` on a second invite for the same (sender, recipient,
    /// group); `NotFound` if the group or either account does not exist
    async fn create_invite(&mut self, invite: &Invite) -> Result<Invite, RepositoryError>;

    async fn get_invite(&mut self, id: Uuid) -> Result<Option<Invite>, RepositoryError>;

    /// `NotFound` if the invite does not exist
    async fn delete_invite(&mut self, id: Uuid) -> Result<(), RepositoryError>;

    /// Ordered by (created_at, id)
    async fn list_invites(
        &mut self,
        filter: &InviteFilter,
        page: Page,
    ) -> Result<Vec<Invite>, RepositoryError>;

    async fn delete_invites_for_group(&mut self, group_id: Uuid) -> Result<u64, RepositoryError>;

    // ─────────────────────────────────────────────────────────────────────

    /// Make every change visible. The unit of work is finished afterwards;
    /// further calls fail with `Unknown`.
    async fn commit(&mut self) -> Result<(), RepositoryError>;
}

pub(crate) fn finished() -> RepositoryError {
    RepositoryError::Unknown("unit of work already finished".to_string())
}

pub(crate) fn still_a_member() -> RepositoryError {
    RepositoryError::Unknown("account still belongs to a group".to_string())
}
