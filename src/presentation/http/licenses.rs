use axum::{
    Router,
    extract::{Multipart, State, multipart::MultipartRejection},
    middleware,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::use_cases::licenses::create::CreateDriverLicense;
use crate::application::use_cases::licenses::manage::{DeleteDriverLicense, GetDriverLicense};
use crate::bootstrap::app_context::AppContext;
use crate::domain::accounts::Role;
use crate::domain::licenses::DriverLicense;
use crate::presentation::http::error::ApiError;
use crate::presentation::http::multipart;
use crate::presentation::http::response::Success;
use crate::presentation::http::session::{self, CurrentAccount};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriverLicenseResponse {
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
    pub created_at: DateTime<Utc>,
}

impl From<DriverLicense> for DriverLicenseResponse {
    fn from(l: DriverLicense) -> Self {
        Self {
            first_name: l.first_name,
            last_name: l.last_name,
            born_date: l.born_date,
            born_place: l.born_place,
            drivers_license_date: l.drivers_license_date,
            licence_validity_period: l.licence_validity_period,
            identity_number: l.identity_number,
            blood_group: l.blood_group,
            front_side_image: l.front_side_image,
            back_side_image: l.back_side_image,
            created_at: l.created_at,
        }
    }
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct LicenseScansMultipart {
    #[schema(value_type = String, format = Binary)]
    front_side: String,
    #[schema(value_type = String, format = Binary)]
    back_side: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/create", post(create_license))
        .route("/me/get", get(get_license))
        .route("/me/delete", post(delete_license))
        .route_layer(middleware::from_fn_with_state(Role::Renter, session::require_role))
        .route_layer(middleware::from_fn_with_state(ctx.clone(), session::require_session))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/v1/driver-license/create", tag = "Driver license",
    request_body(content = LicenseScansMultipart, content_type = "multipart/form-data"),
    responses((status = 201, body = DriverLicenseResponse),
        (status = 409, description = "Driver License Already Exists")))]
pub async fn create_license(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
    form: Result<Multipart, MultipartRejection>,
) -> Result<Success<DriverLicenseResponse>, ApiError> {
    let scans = multipart::license_scans(form?, ctx.cfg.upload_max_bytes).await?;
    let licenses = ctx.license_repo();
    let ocr = ctx.ocr_engine();
    let cdn = ctx.image_cdn();
    let uc = CreateDriverLicense {
        licenses: licenses.as_ref(),
        ocr: ocr.as_ref(),
        cdn: cdn.as_ref(),
    };
    let license = uc
        .execute(&auth.account, &scans, Utc::now().date_naive())
        .await?;
    Ok(Success::created(license.into()).with_message("Driver License Created"))
}

#[utoipa::path(get, path = "/api/v1/driver-license/me/get", tag = "Driver license",
    responses((status = 200, body = DriverLicenseResponse),
        (status = 404, description = "Driver License Not Found")))]
pub async fn get_license(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
) -> Result<Success<DriverLicenseResponse>, ApiError> {
    let licenses = ctx.license_repo();
    let uc = GetDriverLicense {
        licenses: licenses.as_ref(),
    };
    let license = uc.execute(&auth.account).await?;
    Ok(Success::ok(license.into()))
}

#[utoipa::path(post, path = "/api/v1/driver-license/me/delete", tag = "Driver license",
    responses((status = 200, description = "Driver License Deleted")))]
pub async fn delete_license(
    State(ctx): State<AppContext>,
    CurrentAccount(auth): CurrentAccount,
) -> Result<Success, ApiError> {
    let licenses = ctx.license_repo();
    let cdn = ctx.image_cdn();
    let uc = DeleteDriverLicense {
        licenses: licenses.as_ref(),
        cdn: cdn.as_ref(),
    };
    uc.execute(&auth.account).await?;
    Ok(Success::message("Driver License Deleted"))
}
