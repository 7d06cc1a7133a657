use std::sync::Arc;

use crate::application::ports::account_repository::AccountRepository;
use crate::application::ports::car_repository::CarRepository;
use crate::application::ports::driver_license_repository::DriverLicenseRepository;
use crate::application::ports::image_cdn::ImageCdn;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::ocr_engine::OcrEngine;
use crate::application::ports::rental_repository::RentalRepository;
use crate::application::ports::request_log_repository::RequestLogRepository;
use crate::application::ports::token_store::TokenStore;
use crate::application::use_cases::accounts::AccountPolicy;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    account_repo: Arc<dyn AccountRepository>,
    car_repo: Arc<dyn CarRepository>,
    license_repo: Arc<dyn DriverLicenseRepository>,
    rental_repo: Arc<dyn RentalRepository>,
    request_log_repo: Arc<dyn RequestLogRepository>,
    token_store: Arc<dyn TokenStore>,
    image_cdn: Arc<dyn ImageCdn>,
    ocr_engine: Arc<dyn OcrEngine>,
    mailer: Arc<dyn Mailer>,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        car_repo: Arc<dyn CarRepository>,
        license_repo: Arc<dyn DriverLicenseRepository>,
        rental_repo: Arc<dyn RentalRepository>,
        request_log_repo: Arc<dyn RequestLogRepository>,
        token_store: Arc<dyn TokenStore>,
        image_cdn: Arc<dyn ImageCdn>,
        ocr_engine: Arc<dyn OcrEngine>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            account_repo,
            car_repo,
            license_repo,
            rental_repo,
            request_log_repo,
            token_store,
            image_cdn,
            ocr_engine,
            mailer,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn account_policy(&self) -> AccountPolicy {
        self.cfg.account_policy()
    }

    pub fn account_repo(&self) -> Arc<dyn AccountRepository> {
        self.services.account_repo.clone()
    }

    pub fn car_repo(&self) -> Arc<dyn CarRepository> {
        self.services.car_repo.clone()
    }

    pub fn license_repo(&self) -> Arc<dyn DriverLicenseRepository> {
        self.services.license_repo.clone()
    }

    pub fn rental_repo(&self) -> Arc<dyn RentalRepository> {
        self.services.rental_repo.clone()
    }

    pub fn request_log_repo(&self) -> Arc<dyn RequestLogRepository> {
        self.services.request_log_repo.clone()
    }

    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        self.services.token_store.clone()
    }

    pub fn image_cdn(&self) -> Arc<dyn ImageCdn> {
        self.services.image_cdn.clone()
    }

    pub fn ocr_engine(&self) -> Arc<dyn OcrEngine> {
        self.services.ocr_engine.clone()
    }

    pub fn mailer(&self) -> Arc<dyn Mailer> {
        self.services.mailer.clone()
    }
}
