use chrono::Utc;

use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::car_repository::{CarChanges, CarRepository};
use crate::application::ports::image_cdn::ImageCdn;
use crate::application::services::validation::FieldErrors;
use crate::application::use_cases::cars::add_car::{
    check_coordinates, check_fuel_level, check_horse_power, check_price,
};
use crate::application::use_cases::cars::upload_images::{
    CAR_IMAGE_FOLDER, SideImages, check_side_images, upload_side_images,
};
use crate::application::use_cases::cars::{live_car, owned_car};
use crate::domain::accounts::Account;
use crate::domain::cars::Car;
use crate::domain::cars::car::MAX_CAR_IMAGES;

pub struct GetCar<'a, R: CarRepository + ?Sized> {
    pub cars: &'a R,
}

impl<'a, R: CarRepository + ?Sized> GetCar<'a, R> {
    pub async fn execute(&self, car_code: &str) -> ServiceResult<Car> {
        live_car(self.cars, car_code).await
    }
}

pub struct DeleteCar<'a, R: CarRepository + ?Sized> {
    pub cars: &'a R,
}

impl<'a, R: CarRepository + ?Sized> DeleteCar<'a, R> {
    pub async fn execute(&self, owner: &Account, car_code: &str) -> ServiceResult<()> {
        let car = owned_car(self.cars, car_code, owner.id).await?;
        self.cars.soft_delete(car.id, Utc::now()).await?;
        tracing::info!(car_code = %car.car_code, "car_deleted");
        Ok(())
    }
}

fn validate_changes(ch: &CarChanges) -> ServiceResult<()> {
    let mut errs = FieldErrors::new();
    let texts = [
        ("brand", &ch.brand, 2),
        ("model", &ch.model, 2),
        ("modelDetail", &ch.model_detail, 2),
        ("plateNumber", &ch.plate_number, 4),
        ("color", &ch.color, 2),
        ("transmission", &ch.transmission, 2),
    ];
    for (field, value, min) in texts {
        if let Some(v) = value {
            errs.min_len(field, v, min);
        }
    }
    if let Some(year) = ch.year {
        errs.check("year", year >= 1900, "year must be a valid model year");
    }
    if let Some(hp) = ch.horse_power {
        check_horse_power(&mut errs, hp);
    }
    if let Some(level) = ch.fuel_level {
        check_fuel_level(&mut errs, level);
    }
    check_coordinates(&mut errs, ch.latitude, ch.longitude);
    for (field, value) in [
        ("pricePerDay", ch.price_per_day),
        ("pricePerMin", ch.price_per_min),
        ("fuelPrice", ch.fuel_price),
    ] {
        if let Some(v) = value {
            check_price(&mut errs, field, v);
        }
    }
    errs.finish()
}

pub struct UpdateCar<'a, R: CarRepository + ?Sized> {
    pub cars: &'a R,
}

impl<'a, R: CarRepository + ?Sized> UpdateCar<'a, R> {
    pub async fn execute(
        &self,
        owner: &Account,
        car_code: &str,
        changes: &CarChanges,
    ) -> ServiceResult<Car> {
        if changes.is_empty() {
            return Err(ServiceError::bad_request("Nothing to update"));
        }
        validate_changes(changes)?;
        let car = owned_car(self.cars, car_code, owner.id).await?;
        let normalized = CarChanges {
            brand: changes.brand.as_ref().map(|v| v.trim().to_lowercase()),
            model: changes.model.as_ref().map(|v| v.trim().to_lowercase()),
            plate_number: changes.plate_number.as_ref().map(|v| v.trim().to_uppercase()),
            color: changes.color.as_ref().map(|v| v.trim().to_lowercase()),
            transmission: changes.transmission.as_ref().map(|v| v.trim().to_lowercase()),
            ..changes.clone()
        };
        Ok(self.cars.update(car.id, &normalized).await?)
    }
}

/// Appends new photos to an existing car, keeping the total at most five.
pub struct AddCarImages<'a, R, C>
where
    R: CarRepository + ?Sized,
    C: ImageCdn + ?Sized,
{
    pub cars: &'a R,
    pub cdn: &'a C,
}

impl<'a, R, C> AddCarImages<'a, R, C>
where
    R: CarRepository + ?Sized,
    C: ImageCdn + ?Sized,
{
    pub async fn execute(
        &self,
        owner: &Account,
        car_code: &str,
        images: &SideImages,
    ) -> ServiceResult<Car> {
        check_side_images(images)?;
        let mut car = owned_car(self.cars, car_code, owner.id).await?;
        if images.len() > car.image_capacity_left() {
            return Err(ServiceError::bad_request(format!(
                "you can not add more than {MAX_CAR_IMAGES} images"
            )));
        }
        let urls =
            upload_side_images(self.cdn, CAR_IMAGE_FOLDER, &owner.account_code, images).await?;
        self.cars.add_images(car.id, &urls).await?;
        car.images.extend(urls);
        Ok(car)
    }
}
