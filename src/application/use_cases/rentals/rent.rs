use chrono::{DateTime, Utc};

use crate::application::errors::{ConstraintViolation, ServiceError, ServiceResult};
use crate::application::ports::car_repository::CarRepository;
use crate::application::ports::driver_license_repository::DriverLicenseRepository;
use crate::application::ports::rental_repository::{NewRental, RentalRepository};
use crate::application::services::ids;
use crate::domain::accounts::Account;
use crate::domain::rentals::rental::opening_terms;
use crate::domain::rentals::{RentType, Rental};

pub const NOT_RENTABLE: &str = "Car is not rentable";
pub const NO_LICENSE: &str = "You should add your driver license";
pub const LICENSE_EXPIRED: &str = "Your driver license has expired";
pub const ACTIVE_RENTAL: &str = "You already have an active rental. Terminate it first.";

pub struct RentCar<'a, C, L, R>
where
    C: CarRepository + ?Sized,
    L: DriverLicenseRepository + ?Sized,
    R: RentalRepository + ?Sized,
{
    pub cars: &'a C,
    pub licenses: &'a L,
    pub rentals: &'a R,
}

impl<'a, C, L, R> RentCar<'a, C, L, R>
where
    C: CarRepository + ?Sized,
    L: DriverLicenseRepository + ?Sized,
    R: RentalRepository + ?Sized,
{
    pub async fn execute(
        &self,
        renter: &Account,
        car_code: &str,
        rent_type: Option<&str>,
        now: DateTime<Utc>,
    ) -> ServiceResult<Rental> {
        let rent_type = rent_type
            .and_then(RentType::parse)
            .ok_or_else(|| ServiceError::bad_request("rentType must be minute or day"))?;
        let car = self
            .cars
            .find_by_code(car_code)
            .await?
            .filter(|c| c.is_rentable && !c.is_deleted)
            .ok_or_else(|| ServiceError::bad_request(NOT_RENTABLE))?;

        let license = self
            .licenses
            .find_by_renter(renter.id)
            .await?
            .ok_or_else(|| ServiceError::bad_request(NO_LICENSE))?;
        if license.is_expired(now.date_naive()) {
            return Err(ServiceError::bad_request(LICENSE_EXPIRED));
        }
        if self.rentals.find_active_by_renter(renter.id).await?.is_some() {
            return Err(ServiceError::bad_request(ACTIVE_RENTAL));
        }

        let (ending_date, total_fee) = opening_terms(rent_type, now, car.price_per_day);
        let rental = self
            .rentals
            .start(&NewRental {
                rental_code: ids::rental_code(),
                renter_id: renter.id,
                car_id: car.id,
                rent_type,
                starting_date: now,
                ending_date,
                total_fee,
            })
            .await
            .map_err(|err| match err.downcast_ref::<ConstraintViolation>() {
                // A parallel request from the same renter won the race.
                Some(ConstraintViolation::Unique(field)) if field == "activeRental" => {
                    ServiceError::bad_request(ACTIVE_RENTAL)
                }
                _ => ServiceError::from(err),
            })?
            // Another renter claimed the car between the lookup and the update.
            .ok_or_else(|| ServiceError::bad_request(NOT_RENTABLE))?;

        tracing::info!(
            rental_code = %rental.rental_code,
            car_code = %car.car_code,
            rent_type = rent_type.as_str(),
            "rental_started"
        );
        Ok(rental)
    }
}
