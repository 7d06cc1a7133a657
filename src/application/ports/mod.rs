pub mod account_repository;
pub mod car_repository;
pub mod driver_license_repository;
pub mod image_cdn;
pub mod mailer;
pub mod ocr_engine;
pub mod rental_repository;
pub mod request_log_repository;
pub mod token_store;
