use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::token_store::TokenStore;
use crate::application::services::ids::{opaque_token, redis_key};
use crate::domain::accounts::{Account, Role};

pub const SESSION_COOKIE: &str = "sesID";
pub const CSRF_COOKIE: &str = "csrfToken";
pub const OTP_REF_COOKIE: &str = "otpRef";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(skip)]
    pub id: String,
    pub account_id: Uuid,
    pub role: Role,
    pub csrf_token: String,
    pub created_at: DateTime<Utc>,
}

/// Server-side sessions stored as `sesID#<id>` in the token store.
pub struct SessionStore<'a, S: TokenStore + ?Sized> {
    pub store: &'a S,
    pub ttl_secs: u64,
}

impl<'a, S: TokenStore + ?Sized> SessionStore<'a, S> {
    pub fn new(store: &'a S, ttl_secs: u64) -> Self {
        Self { store, ttl_secs }
    }

    pub async fn start(&self, account: &Account) -> anyhow::Result<Session> {
        let session = Session {
            id: opaque_token(),
            account_id: account.id,
            role: account.role,
            csrf_token: opaque_token(),
            created_at: Utc::now(),
        };
        self.save(&session).await?;
        Ok(session)
    }

    pub async fn load(&self, id: &str) -> anyhow::Result<Option<Session>> {
        let Some(raw) = self.store.get(&key(id)).await? else {
            return Ok(None);
        };
        let Ok(mut session) = serde_json::from_str::<Session>(&raw) else {
            tracing::warn!("session_payload_unreadable");
            return Ok(None);
        };
        session.id = id.to_string();
        Ok(Some(session))
    }

    /// Issues a fresh CSRF token for the session and returns it.
    pub async fn rotate_csrf(&self, session: &mut Session) -> anyhow::Result<String> {
        session.csrf_token = opaque_token();
        self.save(session).await?;
        Ok(session.csrf_token.clone())
    }

    pub async fn destroy(&self, id: &str) -> anyhow::Result<()> {
        self.store.delete(&key(id)).await
    }

    async fn save(&self, session: &Session) -> anyhow::Result<()> {
        let raw = serde_json::to_string(session)?;
        self.store.put(&key(&session.id), &raw, self.ttl_secs).await
    }
}

fn key(id: &str) -> String {
    redis_key(SESSION_COOKIE, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryTokenStore;
    use crate::domain::accounts::account::sample_account;

    #[tokio::test]
    async fn start_then_load_returns_same_session() {
        let store = MemoryTokenStore::default();
        let sessions = SessionStore::new(&store, 3600);
        let acc = sample_account(Role::CarOwner);
        let started = sessions.start(&acc).await.unwrap();
        assert!(store.contains(&format!("sesID#{}", started.id)));

        let loaded = sessions.load(&started.id).await.unwrap().unwrap();
        assert_eq!(loaded, started);
        assert_eq!(loaded.role, Role::CarOwner);
    }

    #[tokio::test]
    async fn rotate_csrf_persists_new_token() {
        let store = MemoryTokenStore::default();
        let sessions = SessionStore::new(&store, 3600);
        let mut s = sessions.start(&sample_account(Role::Renter)).await.unwrap();
        let old = s.csrf_token.clone();
        let new = sessions.rotate_csrf(&mut s).await.unwrap();
        assert_ne!(old, new);
        let loaded = sessions.load(&s.id).await.unwrap().unwrap();
        assert_eq!(loaded.csrf_token, new);
    }

    #[tokio::test]
    async fn destroyed_session_is_gone() {
        let store = MemoryTokenStore::default();
        let sessions = SessionStore::new(&store, 3600);
        let s = sessions.start(&sample_account(Role::Renter)).await.unwrap();
        sessions.destroy(&s.id).await.unwrap();
        assert!(sessions.load(&s.id).await.unwrap().is_none());
    }
}
