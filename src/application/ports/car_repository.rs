use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::cars::Car;
use crate::domain::cars::filter::CarFilter;

#[derive(Debug, Clone)]
pub struct NewCar {
    pub car_code: String,
    pub car_owner_id: Uuid,
    pub brand: String,
    pub model: String,
    pub model_detail: String,
    pub year: i32,
    pub plate_number: String,
    pub color: String,
    pub horse_power: i32,
    pub transmission: String,
    pub fuel_level: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_day: f64,
    pub price_per_min: f64,
    pub fuel_price: f64,
    pub images: Vec<String>,
}

/// Owner-editable columns; `None` leaves the column untouched. Availability
/// is only changed by the rental flow.
#[derive(Debug, Clone, Default)]
pub struct CarChanges {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub model_detail: Option<String>,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    pub color: Option<String>,
    pub horse_power: Option<i32>,
    pub transmission: Option<String>,
    pub fuel_level: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_per_day: Option<f64>,
    pub price_per_min: Option<f64>,
    pub fuel_price: Option<f64>,
}

impl CarChanges {
    pub fn is_empty(&self) -> bool {
        self.brand.is_none()
            && self.model.is_none()
            && self.model_detail.is_none()
            && self.year.is_none()
            && self.plate_number.is_none()
            && self.color.is_none()
            && self.horse_power.is_none()
            && self.transmission.is_none()
            && self.fuel_level.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.price_per_day.is_none()
            && self.price_per_min.is_none()
            && self.fuel_price.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct CarPage {
    pub total_length: i64,
    pub cars: Vec<Car>,
}

#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn create(&self, car: &NewCar) -> anyhow::Result<Car>;
    /// Looks up a car including soft-deleted ones.
    async fn find_by_code(&self, car_code: &str) -> anyhow::Result<Option<Car>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Car>>;
    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()>;
    async fn update(&self, id: Uuid, changes: &CarChanges) -> anyhow::Result<Car>;
    async fn add_images(&self, car_id: Uuid, urls: &[String]) -> anyhow::Result<()>;
    /// Drops every stored image of the car and stores `urls` instead.
    /// Returns the urls that were removed.
    async fn replace_images(&self, car_id: Uuid, urls: &[String]) -> anyhow::Result<Vec<String>>;
    /// Rentable, non-deleted cars matching the filter.
    async fn list_rentable(&self, filter: &CarFilter) -> anyhow::Result<CarPage>;
}
