pub mod rental;

pub use rental::{PaymentStatus, RentStatus, RentType, Rental};
