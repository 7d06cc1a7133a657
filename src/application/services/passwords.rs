use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 30;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "passw0rd", "123456", "12345678", "123456789", "qwerty", "qwerty123",
    "abc123", "111111", "iloveyou", "admin", "welcome", "letmein", "monkey", "dragon",
    "sunshine", "football", "baseball", "trustno1", "superman",
];

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string())
}

pub fn verify_password(plain: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Rejects passwords that are easy to guess: fewer than three character
/// classes, a single repeated character, or a well-known password.
pub fn is_strong(plain: &str) -> bool {
    let lowered = plain.to_lowercase();
    if COMMON_PASSWORDS.iter().any(|p| lowered.contains(p)) {
        return false;
    }
    let mut chars = plain.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return false;
        }
    }
    let classes = [
        plain.chars().any(|c| c.is_lowercase()),
        plain.chars().any(|c| c.is_uppercase()),
        plain.chars().any(|c| c.is_ascii_digit()),
        plain.chars().any(|c| !c.is_alphanumeric()),
    ];
    classes.iter().filter(|b| **b).count() >= 3
}
