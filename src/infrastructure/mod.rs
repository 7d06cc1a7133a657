pub mod cache;
pub mod cdn;
pub mod db;
pub mod mail;
pub mod ocr;
