//! PostgreSQL storage backend
//!
//! Each unit of work is one database transaction. `lock_group` takes a row
//! lock on the group (`SELECT ... FOR UPDATE`) that is released when the
//! transaction commits or rolls back.

use fellowship_auth::AccountId;
use fellowship_common::{Page, RepositoryError};
use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{finished, still_a_member, Store, UnitOfWork};
use crate::domain::entities::{Account, Group, Invite, InviteFilter, Member, Role};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

const GROUP_COLUMNS: &str = "id, name, description, created_at, updated_at";
const MEMBER_COLUMNS: &str = "id, group_id, account_id, role, created_at";
const INVITE_COLUMNS: &str =
    "id, group_id, sender_account_id, recipient_account_id, created_at";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply pending migrations
    pub async fn connect(url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| RepositoryError::Unknown(e.to_string()))?;

        tracing::info!("Database migrations applied");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Register an account. Accounts are provisioned outside this domain;
    /// this exists for fixtures and local setups.
    pub async fn insert_account(&self, account: &Account) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO accounts (id, email, name) VALUES ($1, $2, $3)")
            .bind(account.id)
            .bind(&account.email)
            .bind(&account.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Deregister an account. Refused while the account still belongs to a
    /// group; its pending invites go with it.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    still_a_member()
                }
                other => other.into(),
            })?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx: Some(tx) }))
    }
}

struct PgUnitOfWork {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgUnitOfWork {
    fn conn(&mut self) -> Result<&mut PgConnection, RepositoryError> {
        self.tx.as_deref_mut().ok_or_else(finished)
    }
}

#[async_trait::async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn get_account(&mut self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, email, name FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(account)
    }

    async fn create_group(&mut self, group: &Group) -> Result<Group, RepositoryError> {
        let query = format!(
            "INSERT INTO groups ({GROUP_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {GROUP_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Group>(&query)
            .bind(group.id)
            .bind(&group.name)
            .bind(&group.description)
            .bind(group.created_at)
            .bind(group.updated_at)
            .fetch_one(self.conn()?)
            .await?;
        Ok(created)
    }

    async fn get_group(&mut self, id: Uuid) -> Result<Option<Group>, RepositoryError> {
        let query = format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1");
        let group = sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(group)
    }

    async fn lock_group(&mut self, id: Uuid) -> Result<Option<Group>, RepositoryError> {
        let query = format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1 FOR UPDATE");
        let group = sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(group)
    }

    async fn update_group(&mut self, group: &Group) -> Result<Group, RepositoryError> {
        let query = format!(
            "UPDATE groups SET name = $2, description = $3, updated_at = $4 WHERE id = $1 RETURNING {GROUP_COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(group.id)
            .bind(&group.name)
            .bind(&group.description)
            .bind(group.updated_at)
            .fetch_optional(self.conn()?)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_group(&mut self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(self.conn()?)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_groups(&mut self, page: Page) -> Result<Vec<Group>, RepositoryError> {
        let query = format!(
            "SELECT {GROUP_COLUMNS} FROM groups ORDER BY created_at, id OFFSET $1 LIMIT $2"
        );
        let groups = sqlx::query_as::<_, Group>(&query)
            .bind(page.offset)
            .bind(page.limit)
            .fetch_all(self.conn()?)
            .await?;
        Ok(groups)
    }

    async fn create_member(&mut self, member: &Member) -> Result<Member, RepositoryError> {
        let query = format!(
            "INSERT INTO members ({MEMBER_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {MEMBER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Member>(&query)
            .bind(member.id)
            .bind(member.group_id)
            .bind(member.account_id)
            .bind(member.role)
            .bind(member.created_at)
            .fetch_one(self.conn()?)
            .await?;
        Ok(created)
    }

    async fn get_member(
        &mut self,
        group_id: Uuid,
        account_id: AccountId,
    ) -> Result<Option<Member>, RepositoryError> {
        let query =
            format!("SELECT {MEMBER_COLUMNS} FROM members WHERE group_id = $1 AND account_id = $2");
        let member = sqlx::query_as::<_, Member>(&query)
            .bind(group_id)
            .bind(account_id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(member)
    }

    async fn update_member_role(
        &mut self,
        member_id: Uuid,
        role: Role,
    ) -> Result<Member, RepositoryError> {
        let query =
            format!("UPDATE members SET role = $2 WHERE id = $1 RETURNING {MEMBER_COLUMNS}");
        sqlx::query_as::<_, Member>(&query)
            .bind(member_id)
            .bind(role)
            .fetch_optional(self.conn()?)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_member(&mut self, member_id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(member_id)
            .execute(self.conn()?)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_members(
        &mut self,
        group_id: Uuid,
        page: Option<Page>,
    ) -> Result<Vec<Member>, RepositoryError> {
        // LIMIT NULL means no limit
        let (offset, limit) = match page {
            Some(page) => (page.offset, Some(page.limit)),
            None => (0, None),
        };
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE group_id = $1 \
             ORDER BY created_at, id OFFSET $2 LIMIT $3"
        );
        let members = sqlx::query_as::<_, Member>(&query)
            .bind(group_id)
            .bind(offset)
            .bind(limit)
            .fetch_all(self.conn()?)
            .await?;
        Ok(members)
    }

    async fn delete_members_for_group(&mut self, group_id: Uuid) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM members WHERE group_id = $1")
            .bind(group_id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected())
    }

    async fn create_invite(&mut self, invite: &Invite) -> Result<Invite, RepositoryError> {
        let query = format!(
            "INSERT INTO invites ({INVITE_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {INVITE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Invite>(&query)
            .bind(invite.id)
            .bind(invite.group_id)
            .bind(invite.sender_account_id)
            .bind(invite.recipient_account_id)
            .bind(invite.created_at)
            .fetch_one(self.conn()?)
            .await?;
        Ok(created)
    }

    async fn get_invite(&mut self, id: Uuid) -> Result<Option<Invite>, RepositoryError> {
        let query = format!("SELECT {INVITE_COLUMNS} FROM invites WHERE id = $1");
        let invite = sqlx::query_as::<_, Invite>(&query)
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(invite)
    }

    async fn delete_invite(&mut self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM invites WHERE id = $1")
            .bind(id)
            .execute(self.conn()?)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_invites(
        &mut self,
        filter: &InviteFilter,
        page: Page,
    ) -> Result<Vec<Invite>, RepositoryError> {
        let query = format!(
            "SELECT {INVITE_COLUMNS} FROM invites \
             WHERE ($1::uuid IS NULL OR sender_account_id = $1) \
               AND ($2::uuid IS NULL OR recipient_account_id = $2) \
               AND ($3::uuid IS NULL OR group_id = $3) \
             ORDER BY created_at, id OFFSET $4 LIMIT $5"
        );
        let invites = sqlx::query_as::<_, Invite>(&query)
            .bind(filter.sender)
            .bind(filter.recipient)
            .bind(filter.group)
            .bind(page.offset)
            .bind(page.limit)
            .fetch_all(self.conn()?)
            .await?;
        Ok(invites)
    }

    async fn delete_invites_for_group(&mut self, group_id: Uuid) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM invites WHERE group_id = $1")
            .bind(group_id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> Result<(), RepositoryError> {
        let tx = self.tx.take().ok_or_else(finished)?;
        tx.commit().await?;
        Ok(())
    }
}
