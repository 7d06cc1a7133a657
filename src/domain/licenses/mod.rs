pub mod license;
pub mod ocr_parser;

pub use license::DriverLicense;
