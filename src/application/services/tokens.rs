//! Short-lived tokens (email confirmation, OTP, password reset) kept in the
//! token store under `<purpose>#<token>` with a TTL.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::application::ports::token_store::TokenStore;
use crate::application::services::ids::redis_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    ConfirmAccount,
    SigninOtp,
    TwoFactorUpdate,
    ResetPassword,
}

impl TokenPurpose {
    pub fn prefix(&self) -> &'static str {
        match self {
            TokenPurpose::ConfirmAccount => "confirm-account",
            TokenPurpose::SigninOtp => "signin:otpCode",
            TokenPurpose::TwoFactorUpdate => "update2FAStatus#otpCode",
            TokenPurpose::ResetPassword => "reset-password",
        }
    }

    pub fn key(&self, token: &str) -> String {
        redis_key(self.prefix(), token)
    }
}

/// Payload of confirm-account and reset-password tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLink {
    pub account_code: String,
    pub token: String,
}

/// Payload of one-time-code tokens. `is_2fa_enabled` carries the requested
/// state for 2FA changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpChallenge {
    pub account_code: String,
    pub otp_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "is2FAEnabled")]
    pub is_2fa_enabled: Option<bool>,
}

pub struct EphemeralTokens<'a, S: TokenStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: TokenStore + ?Sized> EphemeralTokens<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn issue<T: Serialize + Sync>(
        &self,
        purpose: TokenPurpose,
        token: &str,
        payload: &T,
        ttl_secs: u64,
    ) -> anyhow::Result<()> {
        let raw = serde_json::to_string(payload)?;
        self.store.put(&purpose.key(token), &raw, ttl_secs).await
    }

    pub async fn peek<T: DeserializeOwned>(
        &self,
        purpose: TokenPurpose,
        token: &str,
    ) -> anyhow::Result<Option<T>> {
        let Some(raw) = self.store.get(&purpose.key(token)).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Ok(Some(v)),
            Err(err) => {
                tracing::warn!(error = ?err, purpose = purpose.prefix(), "token_payload_unreadable");
                Ok(None)
            }
        }
    }

    pub async fn revoke(&self, purpose: TokenPurpose, token: &str) -> anyhow::Result<()> {
        self.store.delete(&purpose.key(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryTokenStore;

    #[tokio::test]
    async fn issue_peek_revoke() {
        let store = MemoryTokenStore::default();
        let tokens = EphemeralTokens::new(&store);
        let link = AccountLink {
            account_code: "RTID1".into(),
            token: "tok".into(),
        };
        tokens
            .issue(TokenPurpose::ResetPassword, "tok", &link, 600)
            .await
            .unwrap();
        assert!(store.contains("reset-password#tok"));

        let got: Option<AccountLink> = tokens.peek(TokenPurpose::ResetPassword, "tok").await.unwrap();
        assert_eq!(got, Some(link));

        tokens.revoke(TokenPurpose::ResetPassword, "tok").await.unwrap();
        let got: Option<AccountLink> = tokens.peek(TokenPurpose::ResetPassword, "tok").await.unwrap();
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn purposes_do_not_share_keys() {
        let store = MemoryTokenStore::default();
        let tokens = EphemeralTokens::new(&store);
        let otp = OtpChallenge {
            account_code: "COID1".into(),
            otp_code: "123456".into(),
            is_2fa_enabled: None,
        };
        tokens.issue(TokenPurpose::SigninOtp, "ref", &otp, 180).await.unwrap();
        let other: Option<OtpChallenge> =
            tokens.peek(TokenPurpose::TwoFactorUpdate, "ref").await.unwrap();
        assert_eq!(other, None);
    }

    #[tokio::test]
    async fn unreadable_payload_reads_as_missing() {
        let store = MemoryTokenStore::default();
        store.put("confirm-account#x", "not json", 60).await.unwrap();
        let got: Option<AccountLink> = EphemeralTokens::new(&store)
            .peek(TokenPurpose::ConfirmAccount, "x")
            .await
            .unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn otp_payload_uses_wire_names() {
        let otp = OtpChallenge {
            account_code: "RTID1".into(),
            otp_code: "000111".into(),
            is_2fa_enabled: Some(true),
        };
        let json = serde_json::to_value(&otp).unwrap();
        assert_eq!(json["accountCode"], "RTID1");
        assert_eq!(json["otpCode"], "000111");
        assert_eq!(json["is2FAEnabled"], true);
    }
}
