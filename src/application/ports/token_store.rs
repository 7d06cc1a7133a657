use async_trait::async_trait;

/// Key-value store with per-key expiry, used for every short-lived token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> anyhow::Result<()>;
    /// Returns `None` for unknown or expired keys.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}
