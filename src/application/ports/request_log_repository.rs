use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct RequestLogEntry {
    pub level: String,
    pub message: String,
    pub method: String,
    pub path: String,
    pub headers: serde_json::Value,
    pub status_code: i32,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

#[async_trait]
pub trait RequestLogRepository: Send + Sync {
    async fn insert(&self, entry: &RequestLogEntry) -> anyhow::Result<()>;
}
