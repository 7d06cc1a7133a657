pub mod car;
pub mod filter;

pub use car::{Car, CarImageSide};
