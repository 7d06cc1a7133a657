pub mod accounts;
pub mod cars;
pub mod error;
pub mod health;
pub mod licenses;
pub mod multipart;
pub mod rentals;
pub mod request_log;
pub mod response;
pub mod session;


use axum::{
    Router,
    http::{Method, Uri},
    middleware,
};

use crate::application::errors::ServiceError;
use crate::bootstrap::app_context::AppContext;
use crate::domain::accounts::Role;
use crate::presentation::http::error::ApiError;

async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError(ServiceError::not_found(format!("Cannot {method} {}", uri.path())))
}

/// Every `/api/v1` route, wrapped in the request log.
pub fn api_routes(ctx: AppContext) -> Router {
    Router::new()
        .nest("/api/v1/renter", accounts::routes(ctx.clone(), Role::Renter))
        .nest("/api/v1/car-owner", accounts::routes(ctx.clone(), Role::CarOwner))
        .nest("/api/v1/car", cars::routes(ctx.clone()))
        .nest("/api/v1/driver-license", licenses::routes(ctx.clone()))
        .nest("/api/v1/rent-car", rentals::routes(ctx.clone()))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(ctx, request_log::log_requests))
}
