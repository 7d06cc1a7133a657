use crate::application::errors::ServiceResult;
use crate::application::ports::account_repository::{AccountRepository, NewAccount};
use crate::application::ports::mailer::Mailer;
use crate::application::ports::token_store::TokenStore;
use crate::application::services::tokens::{AccountLink, EphemeralTokens, TokenPurpose};
use crate::application::services::validation::{FieldErrors, is_tr_phone};
use crate::application::services::{emails, ids, passwords};
use crate::application::use_cases::accounts::{AccountPolicy, normalize_email};
use crate::domain::accounts::account::full_name;
use crate::domain::accounts::{Account, Role};

#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirmation: String,
}

impl SignupRequest {
    fn validate(&self) -> ServiceResult<()> {
        FieldErrors::new()
            .len_between("firstName", &self.first_name, 2, 30)
            .len_between("lastName", &self.last_name, 2, 30)
            .email("email", &self.email)
            .check(
                "phone",
                is_tr_phone(&self.phone),
                "phone must be a valid phone number",
            )
            .new_password(
                "password",
                &self.password,
                "passwordConfirmation",
                &self.password_confirmation,
            )
            .finish()
    }
}

pub struct Signup<'a, A, T, M>
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

impl<'a, A, T, M> Signup<'a, A, T, M>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
    M: Mailer + ?Sized,
{
    pub async fn execute(&self, role: Role, req: &SignupRequest) -> ServiceResult<Account> {
        req.validate()?;
        let password_hash = passwords::hash_password(&req.password)?;
        let account = self
            .accounts
            .create(&NewAccount {
                role,
                account_code: ids::account_code(role.code_prefix()),
                first_name: req.first_name.trim().to_string(),
                last_name: req.last_name.trim().to_string(),
                full_name: full_name(&req.first_name, &req.last_name),
                phone: req.phone.trim().to_string(),
                email: normalize_email(&req.email),
                password_hash,
            })
            .await?;
        tracing::info!(account_code = %account.account_code, role = role.as_str(), "account_signed_up");

        send_confirmation(self.tokens, self.mailer, self.policy, &account).await?;
        Ok(account)
    }
}

/// Issues a confirm-account token and mails the link.
pub(crate) async fn send_confirmation<T, M>(
    tokens: &T,
    mailer: &M,
    policy: &AccountPolicy,
    account: &Account,
) -> ServiceResult<()>
where
    T: TokenStore + ?Sized,
    M: Mailer + ?Sized,
{
    let token = ids::link_token();
    EphemeralTokens::new(tokens)
        .issue(
            TokenPurpose::ConfirmAccount,
            &token,
            &AccountLink {
                account_code: account.account_code.clone(),
                token: token.clone(),
            },
            policy.confirm_ttl_secs,
        )
        .await?;
    emails::deliver(
        mailer,
        emails::confirm_account(account, &policy.app_base_url, &token, policy.confirm_ttl_secs),
    )
    .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::ServiceError;
    use crate::application::testing::{MemoryDb, MemoryTokenStore, RecordingMailer};

    pub(crate) fn request() -> SignupRequest {
        SignupRequest {
            first_name: "Ada".into(),
            last_name: "Yilmaz".into(),
            email: "Ada@Example.com ".into(),
            phone: "+905321112233".into(),
            password: "Kedi-42x".into(),
            password_confirmation: "Kedi-42x".into(),
        }
    }

    #[tokio::test]
    async fn signup_creates_pending_account_and_mails_link() {
        let db = MemoryDb::new();
        let store = MemoryTokenStore::new();
        let mailer = RecordingMailer::default();
        let policy = AccountPolicy::default();
        let uc = Signup {
            accounts: &db,
            tokens: &store,
            mailer: &mailer,
            policy: &policy,
        };

        let acc = uc.execute(Role::Renter, &request()).await.unwrap();
        assert_eq!(acc.email, "ada@example.com");
        assert_eq!(acc.full_name, "Ada Yilmaz");
        assert!(acc.account_code.starts_with("RTID"));
        assert!(!acc.is_account_approved);
        assert!(passwords::verify_password("Kedi-42x", &acc.password_hash));

        let mail = mailer.last_to("ada@example.com").unwrap();
        let token = mail
            .body
            .split("/verify/confirm-account/")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap();
        assert_eq!(token.len(), 48);
        assert!(store.contains(&format!("confirm-account#{token}")));
    }

    #[tokio::test]
    async fn duplicate_email_in_same_role_conflicts() {
        let db = MemoryDb::new();
        let store = MemoryTokenStore::new();
        let mailer = RecordingMailer::default();
        let policy = AccountPolicy::default();
        let uc = Signup {
            accounts: &db,
            tokens: &store,
            mailer: &mailer,
            policy: &policy,
        };
        uc.execute(Role::CarOwner, &request()).await.unwrap();
        let err = uc.execute(Role::CarOwner, &request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(m) if m == "email already exists."));

        // Same email may still register as the other role.
        let other = uc.execute(Role::Renter, &request()).await.unwrap();
        assert!(other.account_code.starts_with("RTID"));
    }

    #[tokio::test]
    async fn invalid_fields_are_reported_together() {
        let db = MemoryDb::new();
        let store = MemoryTokenStore::new();
        let mailer = RecordingMailer::default();
        let policy = AccountPolicy::default();
        let uc = Signup {
            accounts: &db,
            tokens: &store,
            mailer: &mailer,
            policy: &policy,
        };
        let mut req = request();
        req.first_name = "A".into();
        req.email = "nope".into();
        req.password_confirmation = "other".into();
        let Err(ServiceError::Validation(fields)) = uc.execute(Role::Renter, &req).await else {
            panic!("expected validation failure");
        };
        assert!(fields.contains_key("firstName"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("passwordConfirmation"));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn mail_outage_does_not_fail_signup() {
        let db = MemoryDb::new();
        let store = MemoryTokenStore::new();
        let mailer = RecordingMailer::failing();
        let policy = AccountPolicy::default();
        let uc = Signup {
            accounts: &db,
            tokens: &store,
            mailer: &mailer,
            policy: &policy,
        };
        assert!(uc.execute(Role::Renter, &request()).await.is_ok());
    }
}
