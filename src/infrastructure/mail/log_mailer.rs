use async_trait::async_trait;

use crate::application::ports::mailer::{Mailer, OutgoingEmail};

/// Used when SMTP is not configured: mail bodies go to the log instead.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "email_not_sent_smtp_disabled"
        );
        Ok(())
    }
}
