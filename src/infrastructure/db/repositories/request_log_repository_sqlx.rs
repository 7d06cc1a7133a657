use async_trait::async_trait;

use crate::application::ports::request_log_repository::{RequestLogEntry, RequestLogRepository};
use crate::infrastructure::db::PgPool;

pub struct SqlxRequestLogRepository {
    pub pool: PgPool,
}

impl SqlxRequestLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestLogRepository for SqlxRequestLogRepository {
    async fn insert(&self, e: &RequestLogEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO request_logs (level, message, method, path, headers, status_code, ip, user_agent)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(&e.level)
        .bind(&e.message)
        .bind(&e.method)
        .bind(&e.path)
        .bind(&e.headers)
        .bind(e.status_code)
        .bind(&e.ip)
        .bind(&e.user_agent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
