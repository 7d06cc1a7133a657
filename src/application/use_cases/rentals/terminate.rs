use chrono::{DateTime, Utc};

use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::car_repository::CarRepository;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::rental_repository::{RentalRepository, Termination};
use crate::application::services::emails::{self, RentalSummary};
use crate::application::services::validation::FieldErrors;
use crate::application::use_cases::cars::add_car::{check_coordinates, check_fuel_level};
use crate::application::use_cases::rentals::{ALREADY_TERMINATED, WRONG_RENTAL_CODE};
use crate::domain::accounts::Account;
use crate::domain::rentals::rental::{billable_minutes, minute_fee};
use crate::domain::rentals::{RentType, Rental};

pub const NOT_YOURS: &str = "You cannot terminate this rent. This rent is not yours.";
pub const OVERDUE: &str =
    "You cannot terminate this rent. You should terminate it before 24 hours.";
pub const IMAGES_MISSING: &str =
    "You cannot terminate this rent. you have to upload car's image first";

#[derive(Debug, Clone)]
pub struct TerminateRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub fuel_level: i32,
}

pub struct TerminateRental<'a, R, C, M>
where
    R: RentalRepository + ?Sized,
    C: CarRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub rentals: &'a R,
    pub cars: &'a C,
    pub mailer: &'a M,
}

impl<'a, R, C, M> TerminateRental<'a, R, C, M>
where
    R: RentalRepository + ?Sized,
    C: CarRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub async fn execute(
        &self,
        renter: &Account,
        rental_code: &str,
        req: &TerminateRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<Rental> {
        let mut errs = FieldErrors::new();
        check_fuel_level(&mut errs, req.fuel_level);
        check_coordinates(&mut errs, Some(req.latitude), Some(req.longitude));
        errs.finish()?;

        let rental = self
            .rentals
            .find_by_code(rental_code)
            .await?
            .ok_or_else(|| ServiceError::bad_request(WRONG_RENTAL_CODE))?;
        if rental.renter_id != renter.id {
            return Err(ServiceError::bad_request(NOT_YOURS));
        }
        if !rental.is_active() {
            return Err(ServiceError::bad_request(ALREADY_TERMINATED));
        }
        if rental.is_overdue(now) {
            return Err(ServiceError::bad_request(OVERDUE));
        }
        if !rental.is_images_uploaded {
            return Err(ServiceError::bad_request(IMAGES_MISSING));
        }

        let car = self
            .cars
            .find_by_id(rental.car_id)
            .await?
            .ok_or_else(|| {
                anyhow::anyhow!("car {} of rental {} is missing", rental.car_id, rental.rental_code)
            })?;

        let minutes = billable_minutes(rental.starting_date, now);
        let (ending_date, total_fee) = match rental.rent_type {
            RentType::Minute => (now, Some(minute_fee(minutes, car.price_per_min))),
            RentType::Day => (rental.ending_date.unwrap_or(now), rental.total_fee),
        };

        let closed = self
            .rentals
            .terminate(&Termination {
                rental_id: rental.id,
                car_id: car.id,
                ending_date,
                total_fee,
                latitude: req.latitude,
                longitude: req.longitude,
                fuel_level: req.fuel_level,
            })
            .await?;
        tracing::info!(
            rental_code = %closed.rental_code,
            minutes,
            total_fee = ?closed.total_fee,
            "rental_terminated"
        );

        emails::deliver(
            self.mailer,
            emails::rental_summary(
                renter,
                &RentalSummary {
                    brand: &car.brand,
                    model: &car.model,
                    plate_number: &car.plate_number,
                    total_minutes: minutes,
                    total_fee: closed.total_fee,
                },
            ),
        )
        .await;
        Ok(closed)
    }
}
