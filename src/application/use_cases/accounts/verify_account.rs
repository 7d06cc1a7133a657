use chrono::Utc;

use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::account_repository::AccountRepository;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::token_store::TokenStore;
use crate::application::services::tokens::{AccountLink, EphemeralTokens, TokenPurpose};
use crate::application::use_cases::accounts::signup::send_confirmation;
use crate::application::use_cases::accounts::{AccountPolicy, normalize_email};
use crate::domain::accounts::Role;

pub struct VerifyAccount<'a, A, T>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
{
    pub accounts: &'a A,
    pub tokens: &'a T,
}

impl<'a, A, T> VerifyAccount<'a, A, T>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
{
    pub async fn execute(&self, role: Role, token: &str) -> ServiceResult<()> {
        let tokens = EphemeralTokens::new(self.tokens);
        let link: AccountLink = tokens
            .peek(TokenPurpose::ConfirmAccount, token)
            .await?
            .ok_or_else(|| {
                ServiceError::unauthorized("Your account verification token has been expired")
            })?;

        let account = self
            .accounts
            .find_by_code(&link.account_code)
            .await?
            .filter(|a| a.role == role && !a.is_account_approved)
            .ok_or_else(|| {
                ServiceError::unauthorized(
                    "User not found. Please contact our support team for more information",
                )
            })?;

        self.accounts.approve(account.id, Utc::now()).await?;
        tokens.revoke(TokenPurpose::ConfirmAccount, token).await?;
        tracing::info!(account_code = %account.account_code, "account_verified");
        Ok(())
    }
}

pub struct ResendVerification<'a, A, T, M>
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

impl<'a, A, T, M> ResendVerification<'a, A, T, M>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
    M: Mailer + ?Sized,
{
    pub async fn execute(&self, role: Role, email: &str) -> ServiceResult<()> {
        let account = self
            .accounts
            .find_by_email(role, &normalize_email(email))
            .await?
            .filter(|a| !a.is_account_approved)
            .ok_or_else(|| {
                ServiceError::bad_request(
                    "Your email address is not found or your account is already verified.",
                )
            })?;
        send_confirmation(self.tokens, self.mailer, self.policy, &account).await
    }
}
