use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two kinds of marketplace accounts. Both share the same auth flows but
/// live in separate namespaces: an email may be registered once per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Renter,
    CarOwner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Renter => "renter",
            Role::CarOwner => "car_owner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "renter" => Some(Role::Renter),
            "car_owner" => Some(Role::CarOwner),
            _ => None,
        }
    }

    /// Prefix of the public account code (`RTID0123...`).
    pub fn code_prefix(&self) -> &'static str {
        match self {
            Role::Renter => "RTID",
            Role::CarOwner => "COID",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub account_code: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub is_account_active: bool,
    pub is_account_approved: bool,
    pub is_account_blocked: bool,
    pub is_account_deleted: bool,
    pub is_2fa_enabled: bool,
    pub account_approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// First reason this account may not sign in, checked in a fixed order.
    pub fn signin_denial(&self) -> Option<&'static str> {
        if !self.is_account_approved {
            return Some("Your account is not verified. Please verify your account.");
        }
        if self.is_account_blocked {
            return Some("Your account is blocked. Please contact support.");
        }
        if !self.is_account_active {
            return Some("Your account is not active. Please contact support.");
        }
        if self.is_account_deleted {
            return Some("Your account is deleted. Please contact support.");
        }
        None
    }

    /// Whether an existing session for this account should still be honoured.
    pub fn can_hold_session(&self) -> bool {
        !self.is_account_blocked && !self.is_account_deleted
    }
}

pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
}

#[cfg(test)]
pub(crate) fn sample_account(role: Role) -> Account {
    let now = Utc::now();
    Account {
        id: Uuid::new_v4(),
        account_code: format!("{}0000000000000001", role.code_prefix()),
        role,
        first_name: "Ada".into(),
        last_name: "Yilmaz".into(),
        full_name: "Ada Yilmaz".into(),
        phone: "+905321112233".into(),
        email: "ada@example.com".into(),
        password_hash: String::new(),
        is_account_active: true,
        is_account_approved: true,
        is_account_blocked: false,
        is_account_deleted: false,
        is_2fa_enabled: false,
        account_approved_at: Some(now),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}
