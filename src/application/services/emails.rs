use crate::application::ports::mailer::{Mailer, OutgoingEmail};
use crate::domain::accounts::Account;

struct EmailTemplate {
    content: &'static str,
}

impl EmailTemplate {
    const fn new(content: &'static str) -> Self {
        Self { content }
    }

    fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = self.content.to_string();
        for (key, value) in vars {
            out = out.replace(&format!("{{{{{key}}}}}"), value);
        }
        out
    }
}

const CONFIRM_ACCOUNT: EmailTemplate =
    EmailTemplate::new(include_str!("../../../templates/emails/confirm_account.txt"));
const SIGNIN_OTP: EmailTemplate =
    EmailTemplate::new(include_str!("../../../templates/emails/signin_otp.txt"));
const TWO_FACTOR_OTP: EmailTemplate =
    EmailTemplate::new(include_str!("../../../templates/emails/two_factor_otp.txt"));
const FORGOT_PASSWORD: EmailTemplate =
    EmailTemplate::new(include_str!("../../../templates/emails/forgot_password.txt"));
const RENTAL_SUMMARY: EmailTemplate =
    EmailTemplate::new(include_str!("../../../templates/emails/rental_summary.txt"));

fn minutes(ttl_secs: u64) -> String {
    ttl_secs.div_ceil(60).to_string()
}

pub fn confirm_account(
    account: &Account,
    app_base_url: &str,
    token: &str,
    ttl_secs: u64,
) -> OutgoingEmail {
    let link = format!("{app_base_url}/verify/confirm-account/{token}");
    OutgoingEmail {
        to: account.email.clone(),
        subject: "Confirm your email address".into(),
        body: CONFIRM_ACCOUNT.render(&[
            ("first_name", &account.first_name),
            ("email", &account.email),
            ("confirm_link", &link),
            ("expiry_minutes", &minutes(ttl_secs)),
        ]),
    }
}

pub fn signin_otp(account: &Account, otp_code: &str, ttl_secs: u64) -> OutgoingEmail {
    OutgoingEmail {
        to: account.email.clone(),
        subject: "Your OTP code".into(),
        body: SIGNIN_OTP.render(&[
            ("first_name", &account.first_name),
            ("otp_code", otp_code),
            ("expiry_minutes", &minutes(ttl_secs)),
        ]),
    }
}

pub fn two_factor_otp(account: &Account, otp_code: &str, ttl_secs: u64) -> OutgoingEmail {
    OutgoingEmail {
        to: account.email.clone(),
        subject: "Your OTP code".into(),
        body: TWO_FACTOR_OTP.render(&[
            ("first_name", &account.first_name),
            ("otp_code", otp_code),
            ("expiry_minutes", &minutes(ttl_secs)),
        ]),
    }
}

pub fn forgot_password(
    account: &Account,
    app_base_url: &str,
    token: &str,
    ttl_secs: u64,
) -> OutgoingEmail {
    let link = format!("{app_base_url}/reset-password/{token}");
    OutgoingEmail {
        to: account.email.clone(),
        subject: "Reset your password".into(),
        body: FORGOT_PASSWORD.render(&[
            ("first_name", &account.first_name),
            ("email", &account.email),
            ("reset_link", &link),
            ("expiry_minutes", &minutes(ttl_secs)),
        ]),
    }
}

pub struct RentalSummary<'a> {
    pub brand: &'a str,
    pub model: &'a str,
    pub plate_number: &'a str,
    pub total_minutes: i64,
    pub total_fee: Option<f64>,
}

pub fn rental_summary(account: &Account, summary: &RentalSummary<'_>) -> OutgoingEmail {
    let fee = summary
        .total_fee
        .map(|f| format!("{f:.2}"))
        .unwrap_or_else(|| "-".into());
    OutgoingEmail {
        to: account.email.clone(),
        subject: "Rent Summary".into(),
        body: RENTAL_SUMMARY.render(&[
            ("first_name", &account.first_name),
            ("brand", summary.brand),
            ("model", summary.model),
            ("plate_number", summary.plate_number),
            ("total_duration", &summary.total_minutes.to_string()),
            ("total_fee", &fee),
        ]),
    }
}

/// Sends without failing the caller; delivery problems are only logged.
pub async fn deliver<M: Mailer + ?Sized>(mailer: &M, email: OutgoingEmail) {
    if let Err(err) = mailer.send(&email).await {
        tracing::warn!(error = ?err, to = %email.to, subject = %email.subject, "email_delivery_failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounts::Role;
    use crate::domain::accounts::account::sample_account;

    #[test]
    fn template_leaves_unknown_placeholders() {
        let t = EmailTemplate::new("Hi {{name}}, {{missing}}");
        assert_eq!(t.render(&[("name", "Ada")]), "Hi Ada, {{missing}}");
    }

    #[test]
    fn confirm_email_carries_link_and_expiry() {
        let acc = sample_account(Role::Renter);
        let mail = confirm_account(&acc, "https://autohire.example", "tok123", 600);
        assert_eq!(mail.to, acc.email);
        assert!(mail.body.contains("https://autohire.example/verify/confirm-account/tok123"));
        assert!(mail.body.contains("10 minutes"));
        assert!(!mail.body.contains("{{"));
    }

    #[test]
    fn reset_email_link() {
        let acc = sample_account(Role::CarOwner);
        let mail = forgot_password(&acc, "http://localhost:3000", "abc", 600);
        assert!(mail.body.contains("http://localhost:3000/reset-password/abc"));
    }

    #[test]
    fn otp_expiry_rounds_up_to_minutes() {
        let acc = sample_account(Role::Renter);
        let mail = signin_otp(&acc, "123456", 90);
        assert!(mail.body.contains("123456"));
        assert!(mail.body.contains("2 minutes"));
    }

    #[test]
    fn summary_formats_fee() {
        let acc = sample_account(Role::Renter);
        let mail = rental_summary(
            &acc,
            &RentalSummary {
                brand: "fiat",
                model: "egea",
                plate_number: "06XYZ99",
                total_minutes: 42,
                total_fee: Some(147.0),
            },
        );
        assert!(mail.body.contains("fiat egea (06XYZ99)"));
        assert!(mail.body.contains("42 minutes"));
        assert!(mail.body.contains("147.00"));
    }
}
