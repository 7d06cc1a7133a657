pub mod accounts;
pub mod cars;
pub mod licenses;
pub mod rentals;
