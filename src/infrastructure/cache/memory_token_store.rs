use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::application::ports::token_store::TokenStore;

/// Process-local token store for single-node deployments without redis.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|m| m.get(key).is_some_and(|(_, exp)| *exp > Instant::now()))
            .unwrap_or(false)
    }

    /// Drops expired entries; called opportunistically on writes.
    fn sweep(map: &mut HashMap<String, (String, Instant)>) {
        let now = Instant::now();
        map.retain(|_, (_, exp)| *exp > now);
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow::anyhow!("token store lock poisoned")
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> anyhow::Result<()> {
        let mut map = self.entries.lock().map_err(poisoned)?;
        Self::sweep(&mut map);
        let expires = Instant::now() + Duration::from_secs(ttl_secs);
        map.insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let map = self.entries.lock().map_err(poisoned)?;
        Ok(map
            .get(key)
            .filter(|(_, exp)| *exp > Instant::now())
            .map(|(v, _)| v.clone()))
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().map_err(poisoned)?.remove(key);
        Ok(())
    }
}
