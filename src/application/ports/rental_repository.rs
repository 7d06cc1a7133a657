use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::rentals::{RentType, Rental};

#[derive(Debug, Clone)]
pub struct NewRental {
    pub rental_code: String,
    pub renter_id: Uuid,
    pub car_id: Uuid,
    pub rent_type: RentType,
    pub starting_date: DateTime<Utc>,
    pub ending_date: Option<DateTime<Utc>>,
    pub total_fee: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Termination {
    pub rental_id: Uuid,
    pub car_id: Uuid,
    pub ending_date: DateTime<Utc>,
    pub total_fee: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub fuel_level: i32,
}

#[async_trait]
pub trait RentalRepository: Send + Sync {
    /// Takes the car off the market and records the rental in one step.
    /// Returns `None` when the car was no longer rentable.
    async fn start(&self, rental: &NewRental) -> anyhow::Result<Option<Rental>>;
    async fn find_by_code(&self, rental_code: &str) -> anyhow::Result<Option<Rental>>;
    async fn find_active_by_renter(&self, renter_id: Uuid) -> anyhow::Result<Option<Rental>>;
    async fn mark_images_uploaded(&self, id: Uuid) -> anyhow::Result<()>;
    /// Closes the rental as paid and puts the car back on the market at its
    /// drop-off position.
    async fn terminate(&self, termination: &Termination) -> anyhow::Result<Rental>;
}
