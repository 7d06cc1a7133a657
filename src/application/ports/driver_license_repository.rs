use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::licenses::DriverLicense;

#[derive(Debug, Clone)]
pub struct NewDriverLicense {
    pub renter_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub born_date: NaiveDate,
    pub born_place: String,
    pub drivers_license_date: NaiveDate,
    pub licence_validity_period: NaiveDate,
    pub identity_number: String,
    pub blood_group: String,
    pub front_side_image: String,
    pub back_side_image: String,
}

#[async_trait]
pub trait DriverLicenseRepository: Send + Sync {
    async fn create(&self, license: &NewDriverLicense) -> anyhow::Result<DriverLicense>;
    async fn find_by_renter(&self, renter_id: Uuid) -> anyhow::Result<Option<DriverLicense>>;
    async fn delete_by_renter(&self, renter_id: Uuid) -> anyhow::Result<bool>;
}
