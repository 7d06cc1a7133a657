pub mod create;
pub mod manage;

pub const LICENSE_NOT_FOUND: &str = "Driver License Not Found";
pub const LICENSE_EXISTS: &str = "Driver License Already Exists";
pub const LICENSE_IMAGE_FOLDER: &str = "driver-license";
