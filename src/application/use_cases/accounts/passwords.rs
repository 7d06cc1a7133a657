use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::account_repository::AccountRepository;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::token_store::TokenStore;
use crate::application::services::passwords::{hash_password, verify_password};
use crate::application::services::tokens::{AccountLink, EphemeralTokens, TokenPurpose};
use crate::application::services::validation::FieldErrors;
use crate::application::services::{emails, ids};
use crate::application::use_cases::accounts::{AccountPolicy, normalize_email};
use crate::domain::accounts::{Account, Role};

#[derive(Debug, Clone)]
pub struct NewPassword {
    pub new_password: String,
    pub new_password_confirmation: String,
}

impl NewPassword {
    fn validate(&self) -> ServiceResult<()> {
        FieldErrors::new()
            .new_password(
                "newPassword",
                &self.new_password,
                "newPasswordConfirmation",
                &self.new_password_confirmation,
            )
            .finish()
    }
}

pub struct ForgotPassword<'a, A, T, M>
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

impl<'a, A, T, M> ForgotPassword<'a, A, T, M>
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
            .ok_or_else(|| ServiceError::bad_request("Your email address is not found."))?;

        let token = ids::link_token();
        EphemeralTokens::new(self.tokens)
            .issue(
                TokenPurpose::ResetPassword,
                &token,
                &AccountLink {
                    account_code: account.account_code.clone(),
                    token: token.clone(),
                },
                self.policy.reset_ttl_secs,
            )
            .await?;
        emails::deliver(
            self.mailer,
            emails::forgot_password(
                &account,
                &self.policy.app_base_url,
                &token,
                self.policy.reset_ttl_secs,
            ),
        )
        .await;
        Ok(())
    }
}

pub struct ResetPassword<'a, A, T>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
{
    pub accounts: &'a A,
    pub tokens: &'a T,
}

impl<'a, A, T> ResetPassword<'a, A, T>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
{
    pub async fn execute(&self, role: Role, token: &str, req: &NewPassword) -> ServiceResult<()> {
        req.validate()?;
        let expired = || ServiceError::unauthorized("Your password reset token has been expired.");
        let tokens = EphemeralTokens::new(self.tokens);
        let link: AccountLink = tokens
            .peek::<AccountLink>(TokenPurpose::ResetPassword, token)
            .await?
            .filter(|l| l.token == token)
            .ok_or_else(expired)?;
        let account = self
            .accounts
            .find_by_code(&link.account_code)
            .await?
            .filter(|a| a.role == role)
            .ok_or_else(expired)?;

        let hash = hash_password(&req.new_password)?;
        self.accounts.update_password(account.id, &hash).await?;
        tokens.revoke(TokenPurpose::ResetPassword, token).await?;
        tracing::info!(account_code = %account.account_code, "password_reset");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: NewPassword,
}

pub struct UpdatePassword<'a, A: AccountRepository + ?Sized> {
    pub accounts: &'a A,
}

impl<'a, A: AccountRepository + ?Sized> UpdatePassword<'a, A> {
    pub async fn execute(&self, account: &Account, req: &UpdatePasswordRequest) -> ServiceResult<()> {
        req.new_password.validate()?;
        let current = self
            .accounts
            .find_by_id(account.id)
            .await?
            .ok_or_else(|| ServiceError::unauthorized("You are not logged in!. Please login"))?;
        if !verify_password(&req.current_password, &current.password_hash) {
            return Err(ServiceError::bad_request(
                "Your current password is wrong. Please try again.",
            ));
        }
        let hash = hash_password(&req.new_password.new_password)?;
        self.accounts.update_password(account.id, &hash).await?;
        Ok(())
    }
}
