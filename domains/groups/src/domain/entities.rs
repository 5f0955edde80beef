//! Domain entities for the Fellowship groups domain
//!
//! Groups own members; invites are pending offers to join a group. An invite
//! row carries no status column: its existence means it is still pending.

use chrono::{DateTime, SubsecRound, Utc};
use fellowship_auth::AccountId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::domain::state::InviteState;

/// Timestamps are kept at microsecond precision so both storage backends
/// order and compare them identically.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Member role within a group
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default,
)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Check if this role meets or exceeds `required`
    pub fn satisfies(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::User, Role::User) => true,
            (Role::User, Role::Admin) => false,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Account as seen by this domain (read-only; owned by the account service)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub name: Option<String>,
}

impl Account {
    pub fn new(id: AccountId, email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name,
        }
    }
}

/// Group entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update and bump `updated_at`
    pub fn apply_update(&mut self, name: Option<String>, description: Option<String>) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        self.updated_at = now();
    }
}

/// Member entity: one account's membership in one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: Uuid,
    pub group_id: Uuid,
    pub account_id: AccountId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(group_id: Uuid, account_id: AccountId, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            account_id,
            role,
            created_at: now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Sort key used for listing and for choosing a successor admin
    pub fn seniority(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, self.id)
    }
}

/// Invite entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invite {
    pub id: Uuid,
    pub group_id: Uuid,
    pub sender_account_id: AccountId,
    pub recipient_account_id: AccountId,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    pub fn new(group_id: Uuid, sender: AccountId, recipient: AccountId) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            sender_account_id: sender,
            recipient_account_id: recipient,
            created_at: now(),
        }
    }

    /// A stored invite is always pending; terminal states delete the row.
    pub fn state(&self) -> InviteState {
        InviteState::Pending
    }

    pub fn is_recipient(&self, account_id: AccountId) -> bool {
        self.recipient_account_id == account_id
    }
}

/// Conjunctive invite filter; `None` fields match everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct InviteFilter {
    pub sender: Option<AccountId>,
    pub recipient: Option<AccountId>,
    pub group: Option<Uuid>,
}

impl InviteFilter {
    pub fn matches(&self, invite: &Invite) -> bool {
        self.sender.is_none_or(|s| s == invite.sender_account_id)
            && self.recipient.is_none_or(|r| r == invite.recipient_account_id)
            && self.group.is_none_or(|g| g == invite.group_id)
    }
}
