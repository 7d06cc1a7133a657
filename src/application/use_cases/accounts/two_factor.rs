use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::account_repository::AccountRepository;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::token_store::TokenStore;
use crate::application::services::tokens::{EphemeralTokens, OtpChallenge, TokenPurpose};
use crate::application::services::{emails, ids};
use crate::application::use_cases::accounts::AccountPolicy;
use crate::application::use_cases::accounts::signin::{OTP_EXPIRED, OTP_WRONG};
use crate::domain::accounts::Account;

fn state_word(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

/// Mails a code that confirms switching 2FA to `enable`. Returns the OTP reference.
pub struct SendTwoFactorOtp<'a, T, M>
where
    T: TokenStore + ?Sized,
    M: Mailer + ?Sized,
{
    pub tokens: &'a T,
    pub mailer: &'a M,
    pub policy: &'a AccountPolicy,
}

impl<'a, T, M> SendTwoFactorOtp<'a, T, M>
where
    T: TokenStore + ?Sized,
    M: Mailer + ?Sized,
{
    pub async fn execute(&self, account: &Account, enable: bool) -> ServiceResult<String> {
        if account.is_2fa_enabled == enable {
            return Err(ServiceError::bad_request(format!(
                "Your 2FA status is already {}",
                state_word(enable)
            )));
        }
        let otp_ref = ids::otp_reference();
        let otp_code = ids::otp_code();
        EphemeralTokens::new(self.tokens)
            .issue(
                TokenPurpose::TwoFactorUpdate,
                &otp_ref,
                &OtpChallenge {
                    account_code: account.account_code.clone(),
                    otp_code: otp_code.clone(),
                    is_2fa_enabled: Some(enable),
                },
                self.policy.otp_ttl_secs,
            )
            .await?;
        emails::deliver(
            self.mailer,
            emails::two_factor_otp(account, &otp_code, self.policy.otp_ttl_secs),
        )
        .await;
        Ok(otp_ref)
    }
}

pub struct UpdateTwoFactor<'a, A, T>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
{
    pub accounts: &'a A,
    pub tokens: &'a T,
}

impl<'a, A, T> UpdateTwoFactor<'a, A, T>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
{
    pub async fn execute(
        &self,
        account: &Account,
        otp_ref: Option<&str>,
        enable: bool,
        otp_code: &str,
    ) -> ServiceResult<Account> {
        let otp_ref = otp_ref.ok_or_else(|| ServiceError::unauthorized(OTP_EXPIRED))?;
        let tokens = EphemeralTokens::new(self.tokens);
        let challenge: OtpChallenge = tokens
            .peek::<OtpChallenge>(TokenPurpose::TwoFactorUpdate, otp_ref)
            .await?
            .filter(|c| c.account_code == account.account_code)
            .ok_or_else(|| ServiceError::unauthorized(OTP_EXPIRED))?;

        if challenge.is_2fa_enabled != Some(enable) {
            return Err(ServiceError::unauthorized(format!(
                "This OTP code was issued to set your 2FA status to {}",
                state_word(!enable)
            )));
        }
        if challenge.otp_code != otp_code.trim() {
            return Err(ServiceError::unauthorized(OTP_WRONG));
        }

        let updated = self.accounts.set_two_factor(account.id, enable).await?;
        tokens.revoke(TokenPurpose::TwoFactorUpdate, otp_ref).await?;
        tracing::info!(account_code = %account.account_code, enabled = enable, "two_factor_updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{MemoryDb, MemoryTokenStore, RecordingMailer};
    use crate::domain::accounts::Role;
    use crate::domain::accounts::account::sample_account;

    #[tokio::test]
    async fn no_op_change_is_rejected() {
        let store = MemoryTokenStore::new();
        let mailer = RecordingMailer::default();
        let policy = AccountPolicy::default();
        let acc = sample_account(Role::Renter);
        let err = SendTwoFactorOtp {
            tokens: &store,
            mailer: &mailer,
            policy: &policy,
        }
        .execute(&acc, false)
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(m) if m == "Your 2FA status is already disabled"));
    }

    #[tokio::test]
    async fn enable_two_factor_with_code() {
        let db = MemoryDb::new();
        let store = MemoryTokenStore::new();
        let mailer = RecordingMailer::default();
        let policy = AccountPolicy::default();
        let acc = sample_account(Role::CarOwner);
        db.insert_account(acc.clone());

        let otp_ref = SendTwoFactorOtp {
            tokens: &store,
            mailer: &mailer,
            policy: &policy,
        }
        .execute(&acc, true)
        .await
        .unwrap();
        let challenge: OtpChallenge = EphemeralTokens::new(&store)
            .peek(TokenPurpose::TwoFactorUpdate, &otp_ref)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(challenge.is_2fa_enabled, Some(true));

        let uc = UpdateTwoFactor {
            accounts: &db,
            tokens: &store,
        };
        let err = uc
            .execute(&acc, Some(otp_ref.as_str()), false, &challenge.otp_code)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let updated = uc
            .execute(&acc, Some(otp_ref.as_str()), true, &challenge.otp_code)
            .await
            .unwrap();
        assert!(updated.is_2fa_enabled);
        assert!(db.account(acc.id).unwrap().is_2fa_enabled);
        assert!(!store.contains(&format!("update2FAStatus#otpCode#{otp_ref}")));
    }

    #[tokio::test]
    async fn code_for_another_account_is_ignored() {
        let db = MemoryDb::new();
        let store = MemoryTokenStore::new();
        let mailer = RecordingMailer::default();
        let policy = AccountPolicy::default();
        let owner = sample_account(Role::Renter);
        let mut intruder = sample_account(Role::Renter);
        intruder.account_code = "RTID9999999999999999".into();

        let otp_ref = SendTwoFactorOtp {
            tokens: &store,
            mailer: &mailer,
            policy: &policy,
        }
        .execute(&owner, true)
        .await
        .unwrap();
        let challenge: OtpChallenge = EphemeralTokens::new(&store)
            .peek(TokenPurpose::TwoFactorUpdate, &otp_ref)
            .await
            .unwrap()
            .unwrap();
        let err = UpdateTwoFactor {
            accounts: &db,
            tokens: &store,
        }
        .execute(&intruder, Some(otp_ref.as_str()), true, &challenge.otp_code)
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(m) if m == OTP_EXPIRED));
    }
}
