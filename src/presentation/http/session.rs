use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, Method, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::application::errors::ServiceError;
use crate::application::services::sessions::{CSRF_COOKIE, OTP_REF_COOKIE, SESSION_COOKIE, Session};
use crate::application::use_cases::accounts::authenticate::{
    AuthenticateSession, Authenticated, NOT_LOGGED_IN,
};
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::domain::accounts::Role;
use crate::presentation::http::error::ApiError;

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|part| part.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().to_string())
}

fn build_cookie(name: &str, value: &str, max_age_secs: u64, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!("{name}={value}; HttpOnly{secure_attr}; Path=/; Max-Age={max_age_secs}; SameSite=Strict")
}

fn append_cookie(headers: &mut HeaderMap, cookie: &str) {
    if let Ok(v) = HeaderValue::from_str(cookie) {
        headers.append(header::SET_COOKIE, v);
    }
}

/// Response cookies for account flows.
pub struct Cookies<'a> {
    cfg: &'a Config,
    headers: HeaderMap,
}

impl<'a> Cookies<'a> {
    pub fn new(cfg: &'a Config) -> Self {
        Self {
            cfg,
            headers: HeaderMap::new(),
        }
    }

    pub fn session(mut self, session: &Session) -> Self {
        let ttl = self.cfg.session_ttl_secs;
        let secure = self.cfg.secure_cookies();
        append_cookie(&mut self.headers, &build_cookie(SESSION_COOKIE, &session.id, ttl, secure));
        append_cookie(
            &mut self.headers,
            &build_cookie(CSRF_COOKIE, &session.csrf_token, ttl, secure),
        );
        self
    }

    pub fn otp_ref(mut self, otp_ref: &str) -> Self {
        let cookie = build_cookie(
            OTP_REF_COOKIE,
            otp_ref,
            self.cfg.otp_ttl_secs,
            self.cfg.secure_cookies(),
        );
        append_cookie(&mut self.headers, &cookie);
        self
    }

    pub fn clear(mut self, name: &str) -> Self {
        let cookie = build_cookie(name, "", 0, self.cfg.secure_cookies());
        append_cookie(&mut self.headers, &cookie);
        self
    }

    pub fn into_headers(self) -> HeaderMap {
        self.headers
    }
}

/// Loads the session named by the `sesID` cookie and stores [`Authenticated`]
/// in the request extensions. A rotated CSRF token is sent back as a cookie.
pub async fn require_session(State(ctx): State<AppContext>, mut req: Request, next: Next) -> Response {
    let session_id = read_cookie(req.headers(), SESSION_COOKIE);
    let csrf = read_cookie(req.headers(), CSRF_COOKIE);
    let strict = ctx.cfg.csrf_strict && req.method() != Method::GET;

    let accounts = ctx.account_repo();
    let tokens = ctx.token_store();
    let policy = ctx.account_policy();
    let uc = AuthenticateSession {
        accounts: accounts.as_ref(),
        tokens: tokens.as_ref(),
        policy: &policy,
    };
    let auth = match uc.execute(session_id.as_deref(), csrf.as_deref(), strict).await {
        Ok(auth) => auth,
        Err(err) => return ApiError(err).into_response(),
    };

    let rotated = auth.rotated_csrf.clone();
    req.extensions_mut().insert(auth);
    let mut resp = next.run(req).await;
    if let Some(token) = rotated {
        let cookie = build_cookie(CSRF_COOKIE, &token, ctx.cfg.session_ttl_secs, ctx.cfg.secure_cookies());
        append_cookie(resp.headers_mut(), &cookie);
    }
    resp
}

/// Must run inside [`require_session`].
pub async fn require_role(State(role): State<Role>, req: Request, next: Next) -> Response {
    let allowed = match req.extensions().get::<Authenticated>() {
        Some(auth) => auth.require_role(role).map(|_| ()),
        None => Err(ServiceError::unauthorized(NOT_LOGGED_IN)),
    };
    match allowed {
        Ok(()) => next.run(req).await,
        Err(err) => ApiError(err).into_response(),
    }
}

/// The signed-in caller placed in the request by [`require_session`].
pub struct CurrentAccount(pub Authenticated);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentAccount
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Authenticated>()
            .cloned()
            .map(CurrentAccount)
            .ok_or_else(|| ApiError(ServiceError::unauthorized(NOT_LOGGED_IN)))
    }
}
