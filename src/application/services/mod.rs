pub mod emails;
pub mod ids;
pub mod passwords;
pub mod sessions;
pub mod tokens;
pub mod validation;
