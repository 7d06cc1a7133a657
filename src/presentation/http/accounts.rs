use axum::{
    Extension, Router,
    extract::{Path, State},
    http::HeaderMap,
    middleware,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::services::sessions::{CSRF_COOKIE, OTP_REF_COOKIE, SESSION_COOKIE};
use crate::application::use_cases::accounts::authenticate::SignOut;
use crate::application::use_cases::accounts::passwords::{
    ForgotPassword, NewPassword, ResetPassword, UpdatePassword, UpdatePasswordRequest,
};
use crate::application::use_cases::accounts::signin::{
    Signin, SigninOutcome, SigninRequest, VerifySigninOtp,
};
use crate::application::use_cases::accounts::signup::{Signup, SignupRequest};
use crate::application::use_cases::accounts::two_factor::{SendTwoFactorOtp, UpdateTwoFactor};
use crate::application::use_cases::accounts::verify_account::{ResendVerification, VerifyAccount};
use crate::bootstrap::app_context::AppContext;
use crate::domain::accounts::{Account, Role};
use crate::presentation::http::error::{ApiError, JsonBody};
use crate::presentation::http::response::Success;
use crate::presentation::http::session::{self, Cookies, CurrentAccount, read_cookie};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupBody {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct EmailBody {
    pub email: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct SigninBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TwoFactorOtpBody {
    #[serde(rename = "is2FAEnabled")]
    pub is_2fa_enabled: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorStatusBody {
    #[serde(rename = "is2FAEnabled")]
    pub is_2fa_enabled: bool,
    pub otp_code: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetPasswordBody {
    pub new_password: String,
    pub new_password_confirmation: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePasswordBody {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub account_code: String,
    #[schema(value_type = String)]
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    #[serde(rename = "is2FAEnabled")]
    pub is_2fa_enabled: bool,
    pub is_account_approved: bool,
    pub is_account_active: bool,
    pub account_approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            account_code: a.account_code,
            role: a.role,
            first_name: a.first_name,
            last_name: a.last_name,
            full_name: a.full_name,
            phone: a.phone,
            email: a.email,
            is_2fa_enabled: a.is_2fa_enabled,
            is_account_approved: a.is_account_approved,
            is_account_active: a.is_account_active,
            account_approved_at: a.account_approved_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Account routes for one role, nested under `/api/v1/renter` or `/api/v1/car-owner`.
pub fn routes(ctx: AppContext, role: Role) -> Router {
    let signed_in = Router::new()
        .route("/account/auth/2fa/send-otp-code", post(send_two_factor_otp))
        .route("/account/auth/2fa/update-status", post(update_two_factor))
        .route("/account/signout", post(signout))
        .route("/account/me", get(me))
        .route("/account/me/update-password", post(update_password))
        .route_layer(middleware::from_fn_with_state(role, session::require_role))
        .route_layer(middleware::from_fn_with_state(ctx.clone(), session::require_session));

    Router::new()
        .route("/auth/signup", post(signup))
        .route("/verify/verify-account/:token", post(verify_account))
        .route("/auth/resend/verify-email", post(resend_verification))
        .route("/auth/signin", post(signin))
        .route("/auth/signin/2fa/verify/:otp_code", post(verify_signin_otp))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password/:token", post(reset_password))
        .merge(signed_in)
        .layer(Extension(role))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/v1/{role}/auth/signup", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner")),
    request_body = SignupBody,
    responses((status = 200, description = "Signed up; confirmation mailed")))]
pub async fn signup(
    State(ctx): State<AppContext>,
    Extension(role): Extension<Role>,
    JsonBody(body): JsonBody<SignupBody>,
) -> Result<Success, ApiError> {
    let accounts = ctx.account_repo();
    let tokens = ctx.token_store();
    let mailer = ctx.mailer();
    let policy = ctx.account_policy();
    let uc = Signup {
        accounts: accounts.as_ref(),
        tokens: tokens.as_ref(),
        mailer: mailer.as_ref(),
        policy: &policy,
    };
    let req = SignupRequest {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        phone: body.phone,
        password: body.password,
        password_confirmation: body.password_confirmation,
    };
    uc.execute(role, &req).await?;
    Ok(Success::message(
        "You are successfully signed up. Please check your email and verify your account",
    ))
}

#[utoipa::path(post, path = "/api/v1/{role}/verify/verify-account/{token}", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner"), ("token" = String, Path, description = "token sent by email")),
    responses((status = 200, description = "Account approved")))]
pub async fn verify_account(
    State(ctx): State<AppContext>,
    Extension(role): Extension<Role>,
    Path(token): Path<String>,
) -> Result<Success, ApiError> {
    let accounts = ctx.account_repo();
    let tokens = ctx.token_store();
    let uc = VerifyAccount {
        accounts: accounts.as_ref(),
        tokens: tokens.as_ref(),
    };
    uc.execute(role, &token).await?;
    Ok(Success::message("Your account has been verified successfully"))
}

#[utoipa::path(post, path = "/api/v1/{role}/auth/resend/verify-email", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner")),
    request_body = EmailBody,
    responses((status = 200, description = "Confirmation mailed again")))]
pub async fn resend_verification(
    State(ctx): State<AppContext>,
    Extension(role): Extension<Role>,
    JsonBody(body): JsonBody<EmailBody>,
) -> Result<Success, ApiError> {
    let accounts = ctx.account_repo();
    let tokens = ctx.token_store();
    let mailer = ctx.mailer();
    let policy = ctx.account_policy();
    let uc = ResendVerification {
        accounts: accounts.as_ref(),
        tokens: tokens.as_ref(),
        mailer: mailer.as_ref(),
        policy: &policy,
    };
    uc.execute(role, &body.email).await?;
    Ok(Success::message("Your verification email has been sent successfully."))
}

#[utoipa::path(post, path = "/api/v1/{role}/auth/signin", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner")),
    request_body = SigninBody,
    responses((status = 200, description = "Signed in, or OTP mailed when 2FA is on")))]
pub async fn signin(
    State(ctx): State<AppContext>,
    Extension(role): Extension<Role>,
    JsonBody(body): JsonBody<SigninBody>,
) -> Result<(HeaderMap, Success), ApiError> {
    let accounts = ctx.account_repo();
    let tokens = ctx.token_store();
    let mailer = ctx.mailer();
    let policy = ctx.account_policy();
    let uc = Signin {
        accounts: accounts.as_ref(),
        tokens: tokens.as_ref(),
        mailer: mailer.as_ref(),
        policy: &policy,
    };
    let req = SigninRequest {
        email: body.email,
        password: body.password,
    };
    match uc.execute(role, &req).await? {
        SigninOutcome::OtpRequired { otp_ref } => Ok((
            Cookies::new(&ctx.cfg).otp_ref(&otp_ref).into_headers(),
            Success::message("Your OTP code has been sent to your email address."),
        )),
        SigninOutcome::SignedIn(session) => Ok((
            Cookies::new(&ctx.cfg).session(&session).into_headers(),
            Success::message("You are successfully signed in."),
        )),
    }
}

#[utoipa::path(post, path = "/api/v1/{role}/auth/signin/2fa/verify/{otp_code}", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner"), ("otp_code" = String, Path, description = "6 digit code sent by email")),
    responses((status = 200, description = "Signed in")))]
pub async fn verify_signin_otp(
    State(ctx): State<AppContext>,
    Extension(role): Extension<Role>,
    Path(otp_code): Path<String>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Success), ApiError> {
    let otp_ref = read_cookie(&headers, OTP_REF_COOKIE);
    let accounts = ctx.account_repo();
    let tokens = ctx.token_store();
    let policy = ctx.account_policy();
    let uc = VerifySigninOtp {
        accounts: accounts.as_ref(),
        tokens: tokens.as_ref(),
        policy: &policy,
    };
    let session = uc.execute(role, otp_ref.as_deref(), &otp_code).await?;
    let cookies = Cookies::new(&ctx.cfg).clear(OTP_REF_COOKIE).session(&session);
    Ok((
        cookies.into_headers(),
        Success::message("You are successfully signed in"),
    ))
}

#[utoipa::path(post, path = "/api/v1/{role}/account/auth/2fa/send-otp-code", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner")),
    request_body = TwoFactorOtpBody,
    responses((status = 200, description = "OTP mailed")))]
pub async fn send_two_factor_otp(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    JsonBody(body): JsonBody<TwoFactorOtpBody>,
) -> Result<(HeaderMap, Success), ApiError> {
    let tokens = ctx.token_store();
    let mailer = ctx.mailer();
    let policy = ctx.account_policy();
    let uc = SendTwoFactorOtp {
        tokens: tokens.as_ref(),
        mailer: mailer.as_ref(),
        policy: &policy,
    };
    let otp_ref = uc.execute(&auth.account, body.is_2fa_enabled).await?;
    Ok((
        Cookies::new(&ctx.cfg).otp_ref(&otp_ref).into_headers(),
        Success::message("Your OTP code has been sent to your email address."),
    ))
}

#[utoipa::path(post, path = "/api/v1/{role}/account/auth/2fa/update-status", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner")),
    request_body = TwoFactorStatusBody,
    responses((status = 200, description = "2FA status changed")))]
pub async fn update_two_factor(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    headers: HeaderMap,
    JsonBody(body): JsonBody<TwoFactorStatusBody>,
) -> Result<(HeaderMap, Success), ApiError> {
    let otp_ref = read_cookie(&headers, OTP_REF_COOKIE);
    let accounts = ctx.account_repo();
    let tokens = ctx.token_store();
    let uc = UpdateTwoFactor {
        accounts: accounts.as_ref(),
        tokens: tokens.as_ref(),
    };
    uc.execute(
        &auth.account,
        otp_ref.as_deref(),
        body.is_2fa_enabled,
        &body.otp_code,
    )
    .await?;
    Ok((
        Cookies::new(&ctx.cfg).clear(OTP_REF_COOKIE).into_headers(),
        Success::message("You have successfully updated your 2FA status."),
    ))
}

#[utoipa::path(post, path = "/api/v1/{role}/account/signout", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner")),
    responses((status = 200, description = "Session destroyed")))]
pub async fn signout(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
) -> Result<(HeaderMap, Success), ApiError> {
    let tokens = ctx.token_store();
    let policy = ctx.account_policy();
    let uc = SignOut {
        tokens: tokens.as_ref(),
        policy: &policy,
    };
    uc.execute(&auth.session).await?;
    let cookies = Cookies::new(&ctx.cfg).clear(CSRF_COOKIE).clear(SESSION_COOKIE);
    Ok((
        cookies.into_headers(),
        Success::message("You are successfully signed out."),
    ))
}

#[utoipa::path(get, path = "/api/v1/{role}/account/me", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner")),
    responses((status = 200, body = AccountResponse)))]
pub async fn me(CurrentAccount(auth): CurrentAccount) -> Success<AccountResponse> {
    Success::ok(auth.account.into())
}

#[utoipa::path(post, path = "/api/v1/{role}/auth/forgot-password", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner")),
    request_body = EmailBody,
    responses((status = 200, description = "Reset link mailed")))]
pub async fn forgot_password(
    State(ctx): State<AppContext>,
    Extension(role): Extension<Role>,
    JsonBody(body): JsonBody<EmailBody>,
) -> Result<Success, ApiError> {
    let accounts = ctx.account_repo();
    let tokens = ctx.token_store();
    let mailer = ctx.mailer();
    let policy = ctx.account_policy();
    let uc = ForgotPassword {
        accounts: accounts.as_ref(),
        tokens: tokens.as_ref(),
        mailer: mailer.as_ref(),
        policy: &policy,
    };
    uc.execute(role, &body.email).await?;
    Ok(Success::message("Your forgot password email has been sent successfully."))
}

#[utoipa::path(post, path = "/api/v1/{role}/auth/reset-password/{token}", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner"), ("token" = String, Path, description = "token sent by email")),
    request_body = ResetPasswordBody,
    responses((status = 200, description = "Password replaced")))]
pub async fn reset_password(
    State(ctx): State<AppContext>,
    Extension(role): Extension<Role>,
    Path(token): Path<String>,
    JsonBody(body): JsonBody<ResetPasswordBody>,
) -> Result<Success, ApiError> {
    let accounts = ctx.account_repo();
    let tokens = ctx.token_store();
    let uc = ResetPassword {
        accounts: accounts.as_ref(),
        tokens: tokens.as_ref(),
    };
    let req = NewPassword {
        new_password: body.new_password,
        new_password_confirmation: body.new_password_confirmation,
    };
    uc.execute(role, &token, &req).await?;
    Ok(Success::message("Your password has been reset successfully."))
}

#[utoipa::path(post, path = "/api/v1/{role}/account/me/update-password", tag = "Accounts",
    params(("role" = String, Path, description = "renter or car-owner")),
    request_body = UpdatePasswordBody,
    responses((status = 200, description = "Password replaced")))]
pub async fn update_password(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    JsonBody(body): JsonBody<UpdatePasswordBody>,
) -> Result<Success, ApiError> {
    let accounts = ctx.account_repo();
    let uc = UpdatePassword {
        accounts: accounts.as_ref(),
    };
    let req = UpdatePasswordRequest {
        current_password: body.current_password,
        new_password: NewPassword {
            new_password: body.new_password,
            new_password_confirmation: body.new_password_confirmation,
        },
    };
    uc.execute(&auth.account, &req).await?;
    Ok(Success::message("Your password has been updated successfully."))
}
