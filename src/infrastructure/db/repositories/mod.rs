pub mod account_repository_sqlx;
pub mod car_repository_sqlx;
pub mod driver_license_repository_sqlx;
pub mod rental_repository_sqlx;
pub mod request_log_repository_sqlx;
