use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::account_repository::AccountRepository;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::token_store::TokenStore;
use crate::application::services::passwords::verify_password;
use crate::application::services::sessions::{Session, SessionStore};
use crate::application::services::tokens::{EphemeralTokens, OtpChallenge, TokenPurpose};
use crate::application::services::{emails, ids};
use crate::application::use_cases::accounts::{AccountPolicy, normalize_email};
use crate::domain::accounts::Role;

const WRONG_CREDENTIALS: &str = "Your email or password is wrong.";
pub(crate) const OTP_EXPIRED: &str = "Your OTP code has been expired. Please try again.";
pub(crate) const OTP_WRONG: &str = "Your OTP code is wrong. Please try again.";

#[derive(Debug, Clone)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigninOutcome {
    /// A code was mailed; the client must echo `otp_ref` back as a cookie.
    OtpRequired { otp_ref: String },
    SignedIn(Session),
}

pub struct Signin<'a, A, T, M>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
    M: Mailer + ?Sized,
{
    pub accounts: &'a A,
    pub tokens: &'a T,
    pub mailer: &'a M,
    pub policy: &'a AccountPolicy,
}

impl<'a, A, T, M> Signin<'a, A, T, M>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
    M: Mailer + ?Sized,
{
    pub async fn execute(&self, role: Role, req: &SigninRequest) -> ServiceResult<SigninOutcome> {
        let account = self
            .accounts
            .find_by_email(role, &normalize_email(&req.email))
            .await?
            .filter(|a| verify_password(&req.password, &a.password_hash))
            .ok_or_else(|| ServiceError::unauthorized(WRONG_CREDENTIALS))?;

        if let Some(reason) = account.signin_denial() {
            return Err(ServiceError::unauthorized(reason));
        }

        if account.is_2fa_enabled {
            let otp_ref = ids::otp_reference();
            let otp_code = ids::otp_code();
            EphemeralTokens::new(self.tokens)
                .issue(
                    TokenPurpose::SigninOtp,
                    &otp_ref,
                    &OtpChallenge {
                        account_code: account.account_code.clone(),
                        otp_code: otp_code.clone(),
                        is_2fa_enabled: None,
                    },
                    self.policy.otp_ttl_secs,
                )
                .await?;
            emails::deliver(
                self.mailer,
                emails::signin_otp(&account, &otp_code, self.policy.otp_ttl_secs),
            )
            .await;
            return Ok(SigninOutcome::OtpRequired { otp_ref });
        }

        let session = SessionStore::new(self.tokens, self.policy.session_ttl_secs)
            .start(&account)
            .await?;
        tracing::info!(account_code = %account.account_code, "signed_in");
        Ok(SigninOutcome::SignedIn(session))
    }
}

pub struct VerifySigninOtp<'a, A, T>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
{
    pub accounts: &'a A,
    pub tokens: &'a T,
    pub policy: &'a AccountPolicy,
}

impl<'a, A, T> VerifySigninOtp<'a, A, T>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
{
    pub async fn execute(
        &self,
        role: Role,
        otp_ref: Option<&str>,
        otp_code: &str,
    ) -> ServiceResult<Session> {
        let otp_ref = otp_ref.ok_or_else(|| ServiceError::unauthorized(OTP_EXPIRED))?;
        let tokens = EphemeralTokens::new(self.tokens);
        let challenge: OtpChallenge = tokens
            .peek(TokenPurpose::SigninOtp, otp_ref)
            .await?
            .ok_or_else(|| ServiceError::unauthorized(OTP_EXPIRED))?;
        if challenge.otp_code != otp_code.trim() {
            return Err(ServiceError::unauthorized(OTP_WRONG));
        }

        let account = self
            .accounts
            .find_by_code(&challenge.account_code)
            .await?
            .filter(|a| a.role == role)
            .ok_or_else(|| ServiceError::unauthorized(OTP_EXPIRED))?;
        if let Some(reason) = account.signin_denial() {
            return Err(ServiceError::unauthorized(reason));
        }

        let session = SessionStore::new(self.tokens, self.policy.session_ttl_secs)
            .start(&account)
            .await?;
        tokens.revoke(TokenPurpose::SigninOtp, otp_ref).await?;
        tracing::info!(account_code = %account.account_code, "signed_in_with_otp");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::passwords::hash_password;
    use crate::application::testing::{MemoryDb, MemoryTokenStore, RecordingMailer};
    use crate::domain::accounts::Account;
    use crate::domain::accounts::account::sample_account;

    fn seeded(db: &MemoryDb, role: Role, tweak: impl FnOnce(&mut Account)) -> Account {
        let mut acc = sample_account(role);
        acc.password_hash = hash_password("Kedi-42x").unwrap();
        tweak(&mut acc);
        db.insert_account(acc.clone());
        acc
    }

    fn req(password: &str) -> SigninRequest {
        SigninRequest {
            email: "ADA@example.com".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn plain_signin_starts_session() {
        let db = MemoryDb::new();
        let store = MemoryTokenStore::new();
        let mailer = RecordingMailer::default();
        let policy = AccountPolicy::default();
        let acc = seeded(&db, Role::Renter, |_| {});
        let out = Signin {
            accounts: &db,
            tokens: &store,
            mailer: &mailer,
            policy: &policy,
        }
        .execute(Role::Renter, &req("Kedi-42x"))
        .await
        .unwrap();
        let SigninOutcome::SignedIn(session) = out else {
            panic!("expected a session");
        };
        assert_eq!(session.account_id, acc.id);
        assert!(store.contains(&format!("sesID#{}", session.id)));
    }

    #[tokio::test]
    async fn wrong_password_or_role_is_generic_401() {
        let db = MemoryDb::new();
        let store = MemoryTokenStore::new();
        let mailer = RecordingMailer::default();
        let policy = AccountPolicy::default();
        seeded(&db, Role::Renter, |_| {});
        let uc = Signin {
            accounts: &db,
            tokens: &store,
            mailer: &mailer,
            policy: &policy,
        };
        for (role, pw) in [(Role::Renter, "wrong"), (Role::CarOwner, "Kedi-42x")] {
            let err = uc.execute(role, &req(pw)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Unauthorized(m) if m == WRONG_CREDENTIALS));
        }
    }

    #[tokio::test]
    async fn blocked_account_cannot_sign_in() {
        let db = MemoryDb::new();
        let store = MemoryTokenStore::new();
        let mailer = RecordingMailer::default();
        let policy = AccountPolicy::default();
        seeded(&db, Role::CarOwner, |a| a.is_account_blocked = true);
        let err = Signin {
            accounts: &db,
            tokens: &store,
            mailer: &mailer,
            policy: &policy,
        }
        .execute(Role::CarOwner, &req("Kedi-42x"))
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(m) if m.contains("blocked")));
    }

    #[tokio::test]
    async fn two_factor_signin_round_trip() {
        let db = MemoryDb::new();
        let store = MemoryTokenStore::new();
        let mailer = RecordingMailer::default();
        let policy = AccountPolicy::default();
        let acc = seeded(&db, Role::Renter, |a| a.is_2fa_enabled = true);

        let out = Signin {
            accounts: &db,
            tokens: &store,
            mailer: &mailer,
            policy: &policy,
        }
        .execute(Role::Renter, &req("Kedi-42x"))
        .await
        .unwrap();
        let SigninOutcome::OtpRequired { otp_ref } = out else {
            panic!("expected otp challenge");
        };
        assert!(otp_ref.starts_with("OTPR"));

        let challenge: OtpChallenge = EphemeralTokens::new(&store)
            .peek(TokenPurpose::SigninOtp, &otp_ref)
            .await
            .unwrap()
            .unwrap();
        assert!(mailer.sent()[0].body.contains(&challenge.otp_code));

        let verify = VerifySigninOtp {
            accounts: &db,
            tokens: &store,
            policy: &policy,
        };
        let err = verify
            .execute(Role::Renter, Some(otp_ref.as_str()), "not-it")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(m) if m == OTP_WRONG));

        let session = verify
            .execute(Role::Renter, Some(otp_ref.as_str()), &challenge.otp_code)
            .await
            .unwrap();
        assert_eq!(session.account_id, acc.id);

        let err = verify
            .execute(Role::Renter, Some(otp_ref.as_str()), &challenge.otp_code)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(m) if m == OTP_EXPIRED));
    }

    #[tokio::test]
    async fn missing_otp_cookie_reads_as_expired() {
        let db = MemoryDb::new();
        let store = MemoryTokenStore::new();
        let policy = AccountPolicy::default();
        let err = VerifySigninOtp {
            accounts: &db,
            tokens: &store,
            policy: &policy,
        }
        .execute(Role::Renter, None, "123456")
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(m) if m == OTP_EXPIRED));
    }
}
