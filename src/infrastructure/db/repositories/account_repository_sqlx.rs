use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::account_repository::{AccountRepository, NewAccount};
use crate::domain::accounts::{Account, Role};
use crate::infrastructure::db::{PgPool, map_db_error};

const ACCOUNT_COLUMNS: &str = r#"id, account_code, role, first_name, last_name, full_name, phone,
    email, password_hash, is_account_active, is_account_approved, is_account_blocked,
    is_account_deleted, is_2fa_enabled, account_approved_at, created_at, updated_at, deleted_at"#;

pub struct SqlxAccountRepository {
    pub pool: PgPool,
}

impl SqlxAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(r: &PgRow) -> anyhow::Result<Account> {
    let role: String = r.get("role");
    Ok(Account {
        id: r.get("id"),
        account_code: r.get("account_code"),
        role: Role::parse(&role).ok_or_else(|| anyhow::anyhow!("unknown account role {role}"))?,
        first_name: r.get("first_name"),
        last_name: r.get("last_name"),
        full_name: r.get("full_name"),
        phone: r.get("phone"),
        email: r.get("email"),
        password_hash: r.get("password_hash"),
        is_account_active: r.get("is_account_active"),
        is_account_approved: r.get("is_account_approved"),
        is_account_blocked: r.get("is_account_blocked"),
        is_account_deleted: r.get("is_account_deleted"),
        is_2fa_enabled: r.get("is_2fa_enabled"),
        account_approved_at: r.get("account_approved_at"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        deleted_at: r.get("deleted_at"),
    })
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    async fn create(&self, new: &NewAccount) -> anyhow::Result<Account> {
        let sql = format!(
            r#"INSERT INTO accounts (account_code, role, first_name, last_name, full_name, phone, email, password_hash)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {ACCOUNT_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(&new.account_code)
            .bind(new.role.as_str())
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.full_name)
            .bind(&new.phone)
            .bind(&new.email)
            .bind(&new.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        account_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_code(&self, account_code: &str) -> anyhow::Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_code = $1");
        let row = sqlx::query(&sql)
            .bind(account_code)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_email(&self, role: Role, email: &str) -> anyhow::Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE role = $1 AND email = $2");
        let row = sqlx::query(&sql)
            .bind(role.as_str())
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn approve(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE accounts SET is_account_approved = TRUE, account_approved_at = $2, updated_at = now()
               WHERE id = $1 AND is_account_approved = FALSE"#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_two_factor(&self, id: Uuid, enabled: bool) -> anyhow::Result<Account> {
        let sql = format!(
            r#"UPDATE accounts SET is_2fa_enabled = $2, updated_at = now()
               WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(enabled)
            .fetch_one(&self.pool)
            .await?;
        account_from_row(&row)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE accounts SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
