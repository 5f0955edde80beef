//! In-memory storage backend
//!
//! A unit of work takes the store's mutex for its whole lifetime and edits a
//! staged copy of the state. Commit writes the copy back; drop discards it.
//! Holding the mutex serializes all units of work, not just those touching
//! the same group.

use std::collections::HashMap;
use std::sync::Arc;

use fellowship_auth::AccountId;
use fellowship_common::{Page, RepositoryError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{finished, still_a_member, Store, UnitOfWork};
use crate::domain::entities::{Account, Group, Invite, InviteFilter, Member, Role};

#[derive(Debug, Default, Clone)]
struct MemoryState {
    accounts: HashMap<AccountId, Account>,
    groups: HashMap<Uuid, Group>,
    members: HashMap<Uuid, Member>,
    invites: HashMap<Uuid, Invite>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account. Accounts are provisioned outside this domain;
    /// this is the in-memory stand-in for that collaborator.
    pub async fn insert_account(&self, account: Account) {
        let mut state = self.state.lock().await;
        state.accounts.insert(account.id, account);
    }

    /// Deregister an account. Refused while the account still belongs to a
    /// group; its pending invites go with it.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        if !state.accounts.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if state.members.values().any(|m| m.account_id == id) {
            return Err(still_a_member());
        }
        state
            .invites
            .retain(|_, i| i.sender_account_id != id && i.recipient_account_id != id);
        state.accounts.remove(&id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard: Some(guard),
            staged,
        }))
    }
}

struct MemoryUnitOfWork {
    guard: Option<OwnedMutexGuard<MemoryState>>,
    staged: MemoryState,
}

impl MemoryUnitOfWork {
    fn state(&mut self) -> Result<&mut MemoryState, RepositoryError> {
        if self.guard.is_none() {
            return Err(finished());
        }
        Ok(&mut self.staged)
    }
}

fn window<T>(items: Vec<T>, page: Page) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(0);
    let limit = usize::try_from(page.limit).unwrap_or(0);
    items.into_iter().skip(offset).take(limit).collect()
}

#[async_trait::async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn get_account(&mut self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.state()?.accounts.get(&id).cloned())
    }

    async fn create_group(&mut self, group: &Group) -> Result<Group, RepositoryError> {
        let state = self.state()?;
        if state.groups.contains_key(&group.id) {
            return Err(RepositoryError::DuplicateKey);
        }
        state.groups.insert(group.id, group.clone());
        Ok(group.clone())
    }

    async fn get_group(&mut self, id: Uuid) -> Result<Option<Group>, RepositoryError> {
        Ok(self.state()?.groups.get(&id).cloned())
    }

    async fn lock_group(&mut self, id: Uuid) -> Result<Option<Group>, RepositoryError> {
        // The store mutex is already held for this unit of work
        self.get_group(id).await
    }

    async fn update_group(&mut self, group: &Group) -> Result<Group, RepositoryError> {
        let stored = self
            .state()?
            .groups
            .get_mut(&group.id)
            .ok_or(RepositoryError::NotFound)?;
        stored.name = group.name.clone();
        stored.description = group.description.clone();
        stored.updated_at = group.updated_at;
        Ok(stored.clone())
    }

    async fn delete_group(&mut self, id: Uuid) -> Result<(), RepositoryError> {
        let state = self.state()?;
        state.groups.remove(&id).ok_or(RepositoryError::NotFound)?;
        state.members.retain(|_, m| m.group_id != id);
        state.invites.retain(|_, i| i.group_id != id);
        Ok(())
    }

    async fn list_groups(&mut self, page: Page) -> Result<Vec<Group>, RepositoryError> {
        let mut groups: Vec<Group> = self.state()?.groups.values().cloned().collect();
        groups.sort_by_key(|g| (g.created_at, g.id));
        Ok(window(groups, page))
    }

    async fn create_member(&mut self, member: &Member) -> Result<Member, RepositoryError> {
        let state = self.state()?;
        if !state.groups.contains_key(&member.group_id)
            || !state.accounts.contains_key(&member.account_id)
        {
            return Err(RepositoryError::NotFound);
        }
        let duplicate = state.members.contains_key(&member.id)
            || state
                .members
                .values()
                .any(|m| m.group_id == member.group_id && m.account_id == member.account_id);
        if duplicate {
            return Err(RepositoryError::DuplicateKey);
        }
        state.members.insert(member.id, member.clone());
        Ok(member.clone())
    }

    async fn get_member(
        &mut self,
        group_id: Uuid,
        account_id: AccountId,
    ) -> Result<Option<Member>, RepositoryError> {
        Ok(self
            .state()?
            .members
            .values()
            .find(|m| m.group_id == group_id && m.account_id == account_id)
            .cloned())
    }

    async fn update_member_role(
        &mut self,
        member_id: Uuid,
        role: Role,
    ) -> Result<Member, RepositoryError> {
        let member = self
            .state()?
            .members
            .get_mut(&member_id)
            .ok_or(RepositoryError::NotFound)?;
        member.role = role;
        Ok(member.clone())
    }

    async fn delete_member(&mut self, member_id: Uuid) -> Result<(), RepositoryError> {
        self.state()?
            .members
            .remove(&member_id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_members(
        &mut self,
        group_id: Uuid,
        page: Option<Page>,
    ) -> Result<Vec<Member>, RepositoryError> {
        let mut members: Vec<Member> = self
            .state()?
            .members
            .values()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.seniority());
        Ok(match page {
            Some(page) => window(members, page),
            None => members,
        })
    }

    async fn delete_members_for_group(&mut self, group_id: Uuid) -> Result<u64, RepositoryError> {
        let state = self.state()?;
        let before = state.members.len();
        state.members.retain(|_, m| m.group_id != group_id);
        Ok((before - state.members.len()) as u64)
    }

    async fn create_invite(&mut self, invite: &Invite) -> Result<Invite, RepositoryError> {
        let state = self.state()?;
        if !state.groups.contains_key(&invite.group_id)
            || !state.accounts.contains_key(&invite.sender_account_id)
            || !state.accounts.contains_key(&invite.recipient_account_id)
        {
            return Err(RepositoryError::NotFound);
        }
        let duplicate = state.invites.contains_key(&invite.id)
            || state.invites.values().any(|i| {
                i.group_id == invite.group_id
                    && i.sender_account_id == invite.sender_account_id
                    && i.recipient_account_id == invite.recipient_account_id
            });
        if duplicate {
            return Err(RepositoryError::DuplicateKey);
        }
        state.invites.insert(invite.id, invite.clone());
        Ok(invite.clone())
    }

    async fn get_invite(&mut self, id: Uuid) -> Result<Option<Invite>, RepositoryError> {
        Ok(self.state()?.invites.get(&id).cloned())
    }

    async fn delete_invite(&mut self, id: Uuid) -> Result<(), RepositoryError> {
        self.state()?
            .invites
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_invites(
        &mut self,
        filter: &InviteFilter,
        page: Page,
    ) -> Result<Vec<Invite>, RepositoryError> {
        let mut invites: Vec<Invite> = self
            .state()?
            .invites
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        invites.sort_by_key(|i| (i.created_at, i.id));
        Ok(window(invites, page))
    }

    async fn delete_invites_for_group(&mut self, group_id: Uuid) -> Result<u64, RepositoryError> {
        let state = self.state()?;
        let before = state.invites.len();
        state.invites.retain(|_, i| i.group_id != group_id);
        Ok((before - state.invites.len()) as u64)
    }

    async fn commit(&mut self) -> Result<(), RepositoryError> {
        let mut guard = self.guard.take().ok_or_else(finished)?;
        *guard = std::mem::take(&mut self.staged);
        Ok(())
    }
}
