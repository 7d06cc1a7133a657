use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::application::errors::ServiceError;
use crate::application::services::passwords::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, is_strong};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("valid email regex"));
// Turkish numbers: optional +90 or 0 trunk prefix, then ten digits starting 2-5.
static TR_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+90|0)?[2-5]\d{9}$").expect("valid phone regex"));

pub fn is_email(v: &str) -> bool {
    EMAIL_RE.is_match(v)
}

pub fn is_tr_phone(v: &str) -> bool {
    let compact: String = v
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    TR_PHONE_RE.is_match(&compact)
}

/// Collects per-field messages and turns them into a single validation error.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `msg` for `field` unless `ok` holds. The first failure per field wins.
    pub fn check(&mut self, field: &str, ok: bool, msg: impl Into<String>) -> &mut Self {
        if !ok {
            self.0.entry(field.to_string()).or_insert_with(|| msg.into());
        }
        self
    }

    pub fn len_between(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let n = value.trim().chars().count();
        self.check(
            field,
            n >= min && n <= max,
            format!("{field} must be between {min} and {max} characters"),
        )
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        self.check(
            field,
            value.trim().chars().count() >= min,
            format!("{field} must be at least {min} characters"),
        )
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(field, is_email(value.trim()), format!("{field} must be an email"))
    }

    /// Length, strength and confirmation checks for a new password.
    pub fn new_password(
        &mut self,
        field: &str,
        value: &str,
        confirmation_field: &str,
        confirmation: &str,
    ) -> &mut Self {
        self.len_between(field, value, MIN_PASSWORD_LEN, MAX_PASSWORD_LEN)
            .check(
                field,
                is_strong(value),
                "Password is too weak. Please use a stronger password.",
            )
            .check(
                confirmation_field,
                value == confirmation,
                "Passwords do not match",
            )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn finish(&mut self) -> Result<(), ServiceError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(std::mem::take(&mut self.0)))
        }
    }
}
