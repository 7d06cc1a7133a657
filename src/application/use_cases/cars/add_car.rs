use crate::application::errors::ServiceResult;
use crate::application::ports::car_repository::{CarRepository, NewCar};
use crate::application::services::ids;
use crate::application::services::validation::FieldErrors;
use crate::domain::accounts::Account;
use crate::domain::cars::Car;
use crate::domain::cars::car::{MAX_CAR_IMAGES, MIN_HORSE_POWER};

#[derive(Debug, Clone)]
pub struct CarDetails {
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
    pub car_images: Vec<String>,
}

// Field checks shared with partial updates.
pub(crate) fn check_horse_power(errs: &mut FieldErrors, v: i32) {
    errs.check(
        "horsePower",
        v >= MIN_HORSE_POWER,
        format!("horsePower must be at least {MIN_HORSE_POWER}"),
    );
}

pub(crate) fn check_fuel_level(errs: &mut FieldErrors, v: i32) {
    errs.check(
        "fuelLevel",
        (0..=100).contains(&v),
        "fuelLevel must be between 0 and 100",
    );
}

pub(crate) fn check_price(errs: &mut FieldErrors, field: &str, v: f64) {
    errs.check(
        field,
        v.is_finite() && v >= 0.0,
        format!("{field} must not be negative"),
    );
}

pub(crate) fn check_coordinates(errs: &mut FieldErrors, lat: Option<f64>, lng: Option<f64>) {
    if let Some(lat) = lat {
        errs.check(
            "latitude",
            (-90.0..=90.0).contains(&lat),
            "latitude must be between -90 and 90",
        );
    }
    if let Some(lng) = lng {
        errs.check(
            "longitude",
            (-180.0..=180.0).contains(&lng),
            "longitude must be between -180 and 180",
        );
    }
}

impl CarDetails {
    fn validate(&self) -> ServiceResult<()> {
        let mut errs = FieldErrors::new();
        errs.min_len("brand", &self.brand, 2);
        errs.min_len("model", &self.model, 2);
        errs.min_len("modelDetail", &self.model_detail, 2);
        errs.min_len("plateNumber", &self.plate_number, 4);
        errs.min_len("color", &self.color, 2);
        errs.min_len("transmission", &self.transmission, 2);
        errs.check("year", self.year >= 1900, "year must be a valid model year");
        check_horse_power(&mut errs, self.horse_power);
        check_fuel_level(&mut errs, self.fuel_level);
        check_coordinates(&mut errs, Some(self.latitude), Some(self.longitude));
        check_price(&mut errs, "pricePerDay", self.price_per_day);
        check_price(&mut errs, "pricePerMin", self.price_per_min);
        check_price(&mut errs, "fuelPrice", self.fuel_price);
        errs.check(
            "carImages",
            self.car_images.len() <= MAX_CAR_IMAGES,
            format!("carImages can hold at most {MAX_CAR_IMAGES} images"),
        )
        .check(
            "carImages",
            self.car_images.iter().all(|u| u.starts_with("http")),
            "carImages must contain image URLs",
        );
        errs.finish()
    }
}

pub struct AddCar<'a, R: CarRepository + ?Sized> {
    pub cars: &'a R,
}

impl<'a, R: CarRepository + ?Sized> AddCar<'a, R> {
    pub async fn execute(&self, owner: &Account, details: &CarDetails) -> ServiceResult<Car> {
        details.validate()?;
        let car = self
            .cars
            .create(&NewCar {
                car_code: ids::car_code(),
                car_owner_id: owner.id,
                brand: details.brand.trim().to_lowercase(),
                model: details.model.trim().to_lowercase(),
                model_detail: details.model_detail.trim().to_string(),
                year: details.year,
                plate_number: details.plate_number.trim().to_uppercase(),
                color: details.color.trim().to_lowercase(),
                horse_power: details.horse_power,
                transmission: details.transmission.trim().to_lowercase(),
                fuel_level: details.fuel_level,
                latitude: details.latitude,
                longitude: details.longitude,
                price_per_day: details.price_per_day,
                price_per_min: details.price_per_min,
                fuel_price: details.fuel_price,
                images: details.car_images.clone(),
            })
            .await?;
        tracing::info!(car_code = %car.car_code, owner = %owner.account_code, "car_added");
        Ok(car)
    }
}

#[cfg(test)]
pub(crate) fn sample_details() -> CarDetails {
    CarDetails {
        brand: "Fiat".into(),
        model: "Egea".into(),
        model_detail: "1.3 multijet".into(),
        year: 2021,
        plate_number: "06 xyz 99".into(),
        color: "red".into(),
        horse_power: 95,
        transmission: "manual".into(),
        fuel_level: 60,
        latitude: 39.92,
        longitude: 32.85,
        price_per_day: 900.0,
        price_per_min: 2.5,
        fuel_price: 42.0,
        car_images: vec!["https://cdn.test/cars/front".into()],
    }
}
