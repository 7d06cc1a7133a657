use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::account_repository::AccountRepository;
use crate::application::ports::token_store::TokenStore;
use crate::application::services::sessions::{Session, SessionStore};
use crate::application::use_cases::accounts::AccountPolicy;
use crate::domain::accounts::{Account, Role};

pub const NOT_LOGGED_IN: &str = "You are not logged in!. Please login";
pub const NOT_AUTHORIZED: &str = "you are not authorized to do this.";

#[derive(Debug, Clone)]
pub struct Authenticated {
    pub account: Account,
    pub session: Session,
    /// Set when the presented CSRF cookie did not match and a new token was issued.
    pub rotated_csrf: Option<String>,
}

impl Authenticated {
    pub fn require_role(&self, role: Role) -> ServiceResult<&Account> {
        if self.account.role != role {
            return Err(ServiceError::unauthorized(NOT_AUTHORIZED));
        }
        Ok(&self.account)
    }
}

pub struct AuthenticateSession<'a, A, T>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
{
    pub accounts: &'a A,
    pub tokens: &'a T,
    pub policy: &'a AccountPolicy,
}

impl<'a, A, T> AuthenticateSession<'a, A, T>
where
    A: AccountRepository + ?Sized,
    T: TokenStore + ?Sized,
{
    /// `reject_csrf_mismatch` turns a CSRF mismatch into 403 instead of a rotation.
    pub async fn execute(
        &self,
        session_id: Option<&str>,
        csrf_cookie: Option<&str>,
        reject_csrf_mismatch: bool,
    ) -> ServiceResult<Authenticated> {
        let not_logged_in = || ServiceError::unauthorized(NOT_LOGGED_IN);
        let sessions = SessionStore::new(self.tokens, self.policy.session_ttl_secs);

        let session_id = session_id.filter(|s| !s.is_empty()).ok_or_else(not_logged_in)?;
        let mut session = sessions.load(session_id).await?.ok_or_else(not_logged_in)?;
        let account = self
            .accounts
            .find_by_id(session.account_id)
            .await?
            .filter(|a| a.role == session.role && a.can_hold_session())
            .ok_or_else(not_logged_in)?;

        let rotated_csrf = if csrf_cookie == Some(session.csrf_token.as_str()) {
            None
        } else if reject_csrf_mismatch {
            tracing::warn!(account_code = %account.account_code, "csrf_mismatch_rejected");
            return Err(ServiceError::Forbidden("Invalid CSRF token".into()));
        } else {
            Some(sessions.rotate_csrf(&mut session).await?)
        };

        Ok(Authenticated {
            account,
            session,
            rotated_csrf,
        })
    }
}

pub struct SignOut<'a, T: TokenStore + ?Sized> {
    pub tokens: &'a T,
    pub policy: &'a AccountPolicy,
}

impl<'a, T: TokenStore + ?Sized> SignOut<'a, T> {
    pub async fn execute(&self, session: &Session) -> ServiceResult<()> {
        SessionStore::new(self.tokens, self.policy.session_ttl_secs)
            .destroy(&session.id)
            .await?;
        Ok(())
    }
}
