use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::{HeaderName, HeaderValue};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use autohire_api::application::ports::mailer::Mailer;
use autohire_api::application::ports::token_store::TokenStore;
use autohire_api::bootstrap::app_context::{AppContext, AppServices};
use autohire_api::bootstrap::config::Config;
use autohire_api::infrastructure::cache::memory_token_store::MemoryTokenStore;
use autohire_api::infrastructure::cache::redis_token_store::RedisTokenStore;
use autohire_api::infrastructure::cdn::s3_image_cdn::S3ImageCdn;
use autohire_api::infrastructure::db::repositories::{
    account_repository_sqlx::SqlxAccountRepository, car_repository_sqlx::SqlxCarRepository,
    driver_license_repository_sqlx::SqlxDriverLicenseRepository,
    rental_repository_sqlx::SqlxRentalRepository,
    request_log_repository_sqlx::SqlxRequestLogRepository,
};
use autohire_api::infrastructure::mail::log_mailer::LogMailer;
use autohire_api::infrastructure::mail::smtp_mailer::SmtpMailer;
use autohire_api::infrastructure::ocr::http_ocr_engine::HttpOcrEngine;
use autohire_api::presentation::http::health::HealthState;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            autohire_api::presentation::http::accounts::signup,
            autohire_api::presentation::http::accounts::verify_account,
            autohire_api::presentation::http::accounts::resend_verification,
            autohire_api::presentation::http::accounts::signin,
            autohire_api::presentation::http::accounts::verify_signin_otp,
            autohire_api::presentation::http::accounts::send_two_factor_otp,
            autohire_api::presentation::http::accounts::update_two_factor,
            autohire_api::presentation::http::accounts::signout,
            autohire_api::presentation::http::accounts::me,
            autohire_api::presentation::http::accounts::forgot_password,
            autohire_api::presentation::http::accounts::reset_password,
            autohire_api::presentation::http::accounts::update_password,
            autohire_api::presentation::http::cars::upload_images,
            autohire_api::presentation::http::cars::add_car,
            autohire_api::presentation::http::cars::get_car,
            autohire_api::presentation::http::cars::delete_car,
            autohire_api::presentation::http::cars::update_car,
            autohire_api::presentation::http::cars::add_car_images,
            autohire_api::presentation::http::cars::list_cars,
            autohire_api::presentation::http::licenses::create_license,
            autohire_api::presentation::http::licenses::get_license,
            autohire_api::presentation::http::licenses::delete_license,
            autohire_api::presentation::http::rentals::rent_car,
            autohire_api::presentation::http::rentals::upload_status_images,
            autohire_api::presentation::http::rentals::terminate_rental,
            autohire_api::presentation::http::health::health,
        ),
        components(schemas(
            autohire_api::presentation::http::accounts::SignupBody,
            autohire_api::presentation::http::accounts::EmailBody,
            autohire_api::presentation::http::accounts::SigninBody,
            autohire_api::presentation::http::accounts::TwoFactorOtpBody,
            autohire_api::presentation::http::accounts::TwoFactorStatusBody,
            autohire_api::presentation::http::accounts::ResetPasswordBody,
            autohire_api::presentation::http::accounts::UpdatePasswordBody,
            autohire_api::presentation::http::accounts::AccountResponse,
            autohire_api::presentation::http::cars::CarDetailsBody,
            autohire_api::presentation::http::cars::CarChangesBody,
            autohire_api::presentation::http::cars::CarResponse,
            autohire_api::presentation::http::cars::CarListResponse,
            autohire_api::presentation::http::cars::CarImagesMultipart,
            autohire_api::presentation::http::licenses::DriverLicenseResponse,
            autohire_api::presentation::http::licenses::LicenseScansMultipart,
            autohire_api::presentation::http::rentals::TerminateBody,
            autohire_api::presentation::http::rentals::RentalResponse,
            autohire_api::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Accounts", description = "Renter and car owner accounts"),
            (name = "Cars", description = "Car listings"),
            (name = "Driver license", description = "Renter driver licenses"),
            (name = "Rentals", description = "Renting and returning cars"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

fn security_headers() -> [SetResponseHeaderLayer<HeaderValue>; 4] {
    [
        SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ),
        SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ),
        SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("strict-transport-security"),
            HeaderValue::from_static("max-age=15552000; includeSubDomains"),
        ),
        SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-xss-protection"),
            HeaderValue::from_static("1; mode=block"),
        ),
    ]
}

fn cors_layer(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE, http::header::COOKIE]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        // Production refuses to start without FRONTEND_URL.
        _ if cfg.is_production => {
            base.allow_origin(AllowOrigin::exact(HeaderValue::from_static("http://invalid")))
        }
        _ => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "shutdown_signal_failed");
    }
    info!("shutdown_requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "autohire_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        port = cfg.api_port,
        production = cfg.is_production,
        redis = cfg.redis_url.is_some(),
        smtp = cfg.smtp.is_some(),
        "Starting AutoHireHub backend"
    );

    // Database
    let pool = autohire_api::infrastructure::db::connect_pool(&cfg.database_url).await?;
    autohire_api::infrastructure::db::migrate(&pool).await?;

    let token_store: Arc<dyn TokenStore> = match cfg.redis_url.as_deref() {
        Some(url) => Arc::new(RedisTokenStore::connect(url).await?),
        None => {
            tracing::warn!("redis_url_missing_using_memory_token_store");
            Arc::new(MemoryTokenStore::new())
        }
    };
    let mailer: Arc<dyn Mailer> = match &cfg.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => Arc::new(LogMailer),
    };

    let services = AppServices::new(
        Arc::new(SqlxAccountRepository::new(pool.clone())),
        Arc::new(SqlxCarRepository::new(pool.clone())),
        Arc::new(SqlxDriverLicenseRepository::new(pool.clone())),
        Arc::new(SqlxRentalRepository::new(pool.clone())),
        Arc::new(SqlxRequestLogRepository::new(pool.clone())),
        token_store.clone(),
        Arc::new(S3ImageCdn::new(&cfg).await?),
        Arc::new(HttpOcrEngine::new(&cfg.ocr_url, &cfg.ocr_language)?),
        mailer,
    );
    let ctx = AppContext::new(cfg.clone(), services);

    let health = HealthState {
        pool: pool.clone(),
        tokens: token_store,
    };
    let [nosniff, frame, hsts, xss] = security_headers();

    let app = Router::new()
        .nest("/api", autohire_api::presentation::http::health::routes(health))
        .merge(autohire_api::presentation::http::api_routes(ctx))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&cfg))
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(nosniff)
        .layer(frame)
        .layer(hsts)
        .layer(xss)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}
