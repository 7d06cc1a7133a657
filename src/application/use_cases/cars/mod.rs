pub mod add_car;
pub mod list_cars;
pub mod manage_car;
pub mod upload_images;

use uuid::Uuid;

use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::car_repository::CarRepository;
use crate::domain::cars::Car;

pub const CAR_NOT_FOUND: &str = "car not found";
pub const NOT_CAR_OWNER: &str = "you are not the owner of this car";

pub(crate) async fn live_car<R: CarRepository + ?Sized>(
    cars: &R,
    car_code: &str,
) -> ServiceResult<Car> {
    cars.find_by_code(car_code)
        .await?
        .filter(|c| !c.is_deleted)
        .ok_or_else(|| ServiceError::not_found(CAR_NOT_FOUND))
}

/// A non-deleted car that belongs to `owner_id`.
pub(crate) async fn owned_car<R: CarRepository + ?Sized>(
    cars: &R,
    car_code: &str,
    owner_id: Uuid,
) -> ServiceResult<Car> {
    let car = live_car(cars, car_code).await?;
    if !car.is_owned_by(owner_id) {
        return Err(ServiceError::conflict(NOT_CAR_OWNER));
    }
    Ok(car)
}
