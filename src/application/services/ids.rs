use base64::Engine as _;
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};

pub const OTP_LENGTH: usize = 6;
pub const OTP_REF_PREFIX: &str = "OTPR";

/// Random `[A-Za-z0-9]` string.
pub fn alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random decimal string; leading zeros allowed.
pub fn digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

pub fn prefixed_digits(prefix: &str, len: usize) -> String {
    format!("{prefix}{}", digits(len))
}

pub fn account_code(prefix: &str) -> String {
    prefixed_digits(prefix, 16)
}

pub fn car_code() -> String {
    digits(24)
}

pub fn rental_code() -> String {
    digits(16)
}

pub fn otp_code() -> String {
    digits(OTP_LENGTH)
}

pub fn otp_reference() -> String {
    format!("{OTP_REF_PREFIX}{}", alphanumeric(32))
}

/// Link token for confirm and reset emails.
pub fn link_token() -> String {
    alphanumeric(48)
}

/// 256 bits of randomness, url-safe, for session ids and CSRF tokens.
pub fn opaque_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub fn redis_key(prefix: &str, suffix: &str) -> String {
    format!("{prefix}#{suffix}")
}
