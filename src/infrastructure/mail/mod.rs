pub mod log_mailer;
pub mod smtp_mailer;
