use std::collections::HashMap;

use axum::{
    Router,
    extract::{Multipart, Path, Query, State, multipart::MultipartRejection},
    middleware,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::ports::car_repository::CarChanges;
use crate::application::use_cases::cars::add_car::{AddCar, CarDetails};
use crate::application::use_cases::cars::list_cars::ListCars;
use crate::application::use_cases::cars::manage_car::{AddCarImages, DeleteCar, GetCar, UpdateCar};
use crate::application::use_cases::cars::upload_images::UploadCarImages;
use crate::bootstrap::app_context::AppContext;
use crate::domain::accounts::Role;
use crate::domain::cars::Car;
use crate::presentation::http::error::{ApiError, JsonBody};
use crate::presentation::http::multipart;
use crate::presentation::http::response::Success;
use crate::presentation::http::session::{self, CurrentAccount};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarDetailsBody {
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
    #[serde(default)]
    pub car_images: Vec<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CarChangesBody {
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

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarResponse {
    pub car_code: String,
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
    pub is_rentable: bool,
    pub is_publish: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub car_images: Vec<String>,
}

impl From<Car> for CarResponse {
    fn from(c: Car) -> Self {
        Self {
            car_code: c.car_code,
            brand: c.brand,
            model: c.model,
            model_detail: c.model_detail,
            year: c.year,
            plate_number: c.plate_number,
            color: c.color,
            horse_power: c.horse_power,
            transmission: c.transmission,
            fuel_level: c.fuel_level,
            latitude: c.latitude,
            longitude: c.longitude,
            price_per_day: c.price_per_day,
            price_per_min: c.price_per_min,
            fuel_price: c.fuel_price,
            is_rentable: c.is_rentable,
            is_publish: c.is_publish,
            created_at: c.created_at,
            updated_at: c.updated_at,
            car_images: c.images,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarListResponse {
    pub limit: i64,
    pub skip: i64,
    pub page: i64,
    pub total_length: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<i64>,
    pub prev_page: i64,
    pub length: usize,
    pub docs: Vec<CarResponse>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CarImagesMultipart {
    #[schema(value_type = String, format = Binary)]
    front_side: String,
    #[schema(value_type = String, format = Binary)]
    back_side: String,
    #[schema(value_type = String, format = Binary)]
    right_side: String,
    #[schema(value_type = String, format = Binary)]
    left_side: String,
    #[schema(value_type = String, format = Binary)]
    inside: String,
}

pub fn routes(ctx: AppContext) -> Router {
    let owner = Router::new()
        .route("/add/image", post(upload_images))
        .route("/add/car-details", post(add_car))
        .route("/delete/:car_code", post(delete_car))
        .route("/update/:car_code", post(update_car))
        .route("/update/image/:car_code", post(add_car_images))
        .route_layer(middleware::from_fn_with_state(Role::CarOwner, session::require_role))
        .route_layer(middleware::from_fn_with_state(ctx.clone(), session::require_session));

    Router::new()
        .route("/get/:car_code", get(get_car))
        .route("/get-all", get(list_cars))
        .merge(owner)
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/v1/car/add/image", tag = "Cars",
    request_body(content = CarImagesMultipart, content_type = "multipart/form-data"),
    responses((status = 200, description = "Uploaded image URLs", body = Vec<String>)))]
pub async fn upload_images(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    form: Result<Multipart, MultipartRejection>,
) -> Result<Success<Vec<String>>, ApiError> {
    let images = multipart::side_images(form?, ctx.cfg.upload_max_bytes).await?;
    let cdn = ctx.image_cdn();
    let uc = UploadCarImages { cdn: cdn.as_ref() };
    let urls = uc.execute(&auth.account, &images).await?;
    Ok(Success::ok(urls).with_message("Car's images added successfully"))
}

#[utoipa::path(post, path = "/api/v1/car/add/car-details", tag = "Cars",
    request_body = CarDetailsBody,
    responses((status = 201, body = CarResponse)))]
pub async fn add_car(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    JsonBody(body): JsonBody<CarDetailsBody>,
) -> Result<Success<CarResponse>, ApiError> {
    let cars = ctx.car_repo();
    let uc = AddCar {
        cars: cars.as_ref(),
    };
    let details = CarDetails {
        brand: body.brand,
        model: body.model,
        model_detail: body.model_detail,
        year: body.year,
        plate_number: body.plate_number,
        color: body.color,
        horse_power: body.horse_power,
        transmission: body.transmission,
        fuel_level: body.fuel_level,
        latitude: body.latitude,
        longitude: body.longitude,
        price_per_day: body.price_per_day,
        price_per_min: body.price_per_min,
        fuel_price: body.fuel_price,
        car_images: body.car_images,
    };
    let car = uc.execute(&auth.account, &details).await?;
    Ok(Success::created(car.into()).with_message("car added successfully"))
}

#[utoipa::path(get, path = "/api/v1/car/get/{car_code}", tag = "Cars",
    params(("car_code" = String, Path, description = "24 digit car code")),
    responses((status = 200, body = CarResponse), (status = 404, description = "car not found")))]
pub async fn get_car(
    State(ctx): State<AppContext>,
    Path(car_code): Path<String>,
) -> Result<Success<CarResponse>, ApiError> {
    let cars = ctx.car_repo();
    let uc = GetCar {
        cars: cars.as_ref(),
    };
    let car = uc.execute(&car_code).await?;
    Ok(Success::ok(car.into()))
}

#[utoipa::path(post, path = "/api/v1/car/delete/{car_code}", tag = "Cars",
    params(("car_code" = String, Path, description = "24 digit car code")),
    responses((status = 200, description = "Soft deleted")))]
pub async fn delete_car(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    Path(car_code): Path<String>,
) -> Result<Success, ApiError> {
    let cars = ctx.car_repo();
    let uc = DeleteCar {
        cars: cars.as_ref(),
    };
    uc.execute(&auth.account, &car_code).await?;
    Ok(Success::message("car deleted successfully"))
}

#[utoipa::path(post, path = "/api/v1/car/update/{car_code}", tag = "Cars",
    params(("car_code" = String, Path, description = "24 digit car code")),
    request_body = CarChangesBody,
    responses((status = 200, body = CarResponse)))]
pub async fn update_car(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    Path(car_code): Path<String>,
    JsonBody(body): JsonBody<CarChangesBody>,
) -> Result<Success<CarResponse>, ApiError> {
    let cars = ctx.car_repo();
    let uc = UpdateCar {
        cars: cars.as_ref(),
    };
    let changes = CarChanges {
        brand: body.brand,
        model: body.model,
        model_detail: body.model_detail,
        year: body.year,
        plate_number: body.plate_number,
        color: body.color,
        horse_power: body.horse_power,
        transmission: body.transmission,
        fuel_level: body.fuel_level,
        latitude: body.latitude,
        longitude: body.longitude,
        price_per_day: body.price_per_day,
        price_per_min: body.price_per_min,
        fuel_price: body.fuel_price,
    };
    let car = uc.execute(&auth.account, &car_code, &changes).await?;
    Ok(Success::ok(car.into()).with_message("car updated successfully"))
}

#[utoipa::path(post, path = "/api/v1/car/update/image/{car_code}", tag = "Cars",
    params(("car_code" = String, Path, description = "24 digit car code")),
    request_body(content = CarImagesMultipart, content_type = "multipart/form-data"),
    responses((status = 200, body = CarResponse)))]
pub async fn add_car_images(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    Path(car_code): Path<String>,
    form: Result<Multipart, MultipartRejection>,
) -> Result<Success<CarResponse>, ApiError> {
    let images = multipart::side_images(form?, ctx.cfg.upload_max_bytes).await?;
    let cars = ctx.car_repo();
    let cdn = ctx.image_cdn();
    let uc = AddCarImages {
        cars: cars.as_ref(),
        cdn: cdn.as_ref(),
    };
    let car = uc.execute(&auth.account, &car_code, &images).await?;
    Ok(Success::ok(car.into()).with_message("Images updated."))
}

/// Query keys: range fields (`horsePower=50-120`), equality fields
/// (`brand=fiat`), `sort`, `page`, `limit`.
#[utoipa::path(get, path = "/api/v1/car/get-all", tag = "Cars",
    params(
        ("sort" = Option<String>, Query, description = "e.g. PRICEPD_BY_ASC or MOST_RECENT"),
        ("page" = Option<i64>, Query, description = "1-based page"),
        ("limit" = Option<i64>, Query, description = "page size, at most 100"),
    ),
    responses((status = 200, body = CarListResponse)))]
pub async fn list_cars(
    State(ctx): State<AppContext>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Success<CarListResponse>, ApiError> {
    let cars = ctx.car_repo();
    let uc = ListCars {
        cars: cars.as_ref(),
    };
    let listing = uc.execute(&query).await?;
    let p = listing.pagination;
    let docs: Vec<CarResponse> = listing.cars.into_iter().map(Into::into).collect();
    Ok(Success::ok(CarListResponse {
        limit: p.limit,
        skip: p.skip,
        page: p.page,
        total_length: p.total_length,
        total_pages: p.total_pages,
        current_page: p.current_page,
        has_next_page: p.has_next_page,
        has_prev_page: p.has_prev_page,
        next_page: p.next_page,
        prev_page: p.prev_page,
        length: docs.len(),
        docs,
    }))
}
