use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::accounts::{Account, Role};

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub role: Role,
    pub account_code: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(&self, account: &NewAccount) -> anyhow::Result<Account>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>>;
    async fn find_by_code(&self, account_code: &str) -> anyhow::Result<Option<Account>>;
    async fn find_by_email(&self, role: Role, email: &str) -> anyhow::Result<Option<Account>>;
    /// Marks a pending account approved. Returns false when it was already approved.
    async fn approve(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<bool>;
    async fn set_two_factor(&self, id: Uuid, enabled: bool) -> anyhow::Result<Account>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()>;
}
