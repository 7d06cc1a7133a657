use std::collections::HashMap;

use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::car_repository::CarRepository;
use crate::domain::cars::Car;
use crate::domain::cars::filter::{CarFilter, Pagination};

#[derive(Debug, Clone)]
pub struct CarListing {
    pub pagination: Pagination,
    pub cars: Vec<Car>,
}

pub struct ListCars<'a, R: CarRepository + ?Sized> {
    pub cars: &'a R,
}

impl<'a, R: CarRepository + ?Sized> ListCars<'a, R> {
    pub async fn execute(&self, query: &HashMap<String, String>) -> ServiceResult<CarListing> {
        let filter =
            CarFilter::from_query(query).map_err(|e| ServiceError::bad_request(e.to_string()))?;
        let page = self.cars.list_rentable(&filter).await?;
        Ok(CarListing {
            pagination: Pagination::compute(filter.page, page.total_length),
            cars: page.cars,
        })
    }
}
