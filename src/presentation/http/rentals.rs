use axum::{
    Router,
    extract::{Multipart, Path, Query, State, multipart::MultipartRejection},
    middleware,
    routing::post,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::use_cases::rentals::rent::RentCar;
use crate::application::use_cases::rentals::status_images::UploadStatusImages;
use crate::application::use_cases::rentals::terminate::{TerminateRental, TerminateRequest};
use crate::bootstrap::app_context::AppContext;
use crate::domain::accounts::Role;
use crate::domain::rentals::Rental;
use crate::presentation::http::cars::CarImagesMultipart;
use crate::presentation::http::error::{ApiError, JsonBody};
use crate::presentation::http::multipart;
use crate::presentation::http::response::Success;
use crate::presentation::http::session::{self, CurrentAccount};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentQuery {
    pub rent_type: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TerminateBody {
    pub latitude: f64,
    pub longitude: f64,
    pub fuel_level: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalResponse {
    pub rental_code: String,
    pub rent_type: &'static str,
    pub starting_date: DateTime<Utc>,
    pub ending_date: Option<DateTime<Utc>>,
    pub total_fee: Option<f64>,
    pub rent_status: &'static str,
    pub payment_status: &'static str,
    pub is_images_uploaded: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Rental> for RentalResponse {
    fn from(r: Rental) -> Self {
        Self {
            rent_type: r.rent_type.as_str(),
            rent_status: r.rent_status.as_str(),
            payment_status: r.payment_status.as_str(),
            rental_code: r.rental_code,
            starting_date: r.starting_date,
            ending_date: r.ending_date,
            total_fee: r.total_fee,
            is_images_uploaded: r.is_images_uploaded,
            created_at: r.created_at,
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/rent/:car_code", post(rent_car))
        .route("/car-status/upload-image/:rental_code", post(upload_status_images))
        .route("/terminate/:rental_code", post(terminate_rental))
        .route_layer(middleware::from_fn_with_state(Role::Renter, session::require_role))
        .route_layer(middleware::from_fn_with_state(ctx.clone(), session::require_session))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/v1/rent-car/rent/{car_code}", tag = "Rentals",
    params(("car_code" = String, Path, description = "24 digit car code"), ("rentType" = String, Query, description = "minute or day")),
    responses((status = 200, body = RentalResponse), (status = 400, description = "Car is not rentable")))]
pub async fn rent_car(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    Path(car_code): Path<String>,
    Query(query): Query<RentQuery>,
) -> Result<Success<RentalResponse>, ApiError> {
    let cars = ctx.car_repo();
    let licenses = ctx.license_repo();
    let rentals = ctx.rental_repo();
    let uc = RentCar {
        cars: cars.as_ref(),
        licenses: licenses.as_ref(),
        rentals: rentals.as_ref(),
    };
    let rental = uc
        .execute(&auth.account, &car_code, query.rent_type.as_deref(), Utc::now())
        .await?;
    Ok(Success::ok(rental.into()).with_message("You rented car successfully."))
}

#[utoipa::path(post, path = "/api/v1/rent-car/car-status/upload-image/{rental_code}", tag = "Rentals",
    params(("rental_code" = String, Path, description = "16 digit rental code")),
    request_body(content = CarImagesMultipart, content_type = "multipart/form-data"),
    responses((status = 200, description = "Uploaded image URLs", body = Vec<String>)))]
pub async fn upload_status_images(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    Path(rental_code): Path<String>,
    form: Result<Multipart, MultipartRejection>,
) -> Result<Success<Vec<String>>, ApiError> {
    let images = multipart::side_images(form?, ctx.cfg.upload_max_bytes).await?;
    let rentals = ctx.rental_repo();
    let cars = ctx.car_repo();
    let cdn = ctx.image_cdn();
    let uc = UploadStatusImages {
        rentals: rentals.as_ref(),
        cars: cars.as_ref(),
        cdn: cdn.as_ref(),
    };
    let urls = uc.execute(&auth.account, &rental_code, &images).await?;
    Ok(Success::ok(urls).with_message("You uploaded car images successfully."))
}

#[utoipa::path(post, path = "/api/v1/rent-car/terminate/{rental_code}", tag = "Rentals",
    params(("rental_code" = String, Path, description = "16 digit rental code")),
    request_body = TerminateBody,
    responses((status = 200, body = RentalResponse)))]
pub async fn terminate_rental(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    Path(rental_code): Path<String>,
    JsonBody(body): JsonBody<TerminateBody>,
) -> Result<Success<RentalResponse>, ApiError> {
    let rentals = ctx.rental_repo();
    let cars = ctx.car_repo();
    let mailer = ctx.mailer();
    let uc = TerminateRental {
        rentals: rentals.as_ref(),
        cars: cars.as_ref(),
        mailer: mailer.as_ref(),
    };
    let req = TerminateRequest {
        latitude: body.latitude,
        longitude: body.longitude,
        fuel_level: body.fuel_level,
    };
    let rental = uc
        .execute(&auth.account, &rental_code, &req, Utc::now())
        .await?;
    Ok(Success::ok(rental.into()).with_message("You terminated rent successfully."))
}
