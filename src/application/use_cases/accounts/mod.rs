pub mod authenticate;
pub mod passwords;
pub mod signin;
pub mod signup;
pub mod two_factor;
pub mod verify_account;

/// Links and lifetimes used by the account flows.
#[derive(Debug, Clone)]
pub struct AccountPolicy {
    pub app_base_url: String,
    pub confirm_ttl_secs: u64,
    pub otp_ttl_secs: u64,
    pub reset_ttl_secs: u64,
    pub session_ttl_secs: u64,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            app_base_url: "http://localhost:3000".into(),
            confirm_ttl_secs: 10 * 60,
            otp_ttl_secs: 3 * 60,
            reset_ttl_secs: 10 * 60,
            session_ttl_secs: 3 * 24 * 60 * 60,
        }
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
