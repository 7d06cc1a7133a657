use chrono::NaiveDate;

use crate::application::errors::{ConstraintViolation, ServiceError, ServiceResult};
use crate::application::ports::driver_license_repository::{
    DriverLicenseRepository, NewDriverLicense,
};
use crate::application::ports::image_cdn::{ImageCdn, ImageUpload};
use crate::application::ports::ocr_engine::OcrEngine;
use crate::application::services::ids;
use crate::application::use_cases::licenses::{LICENSE_EXISTS, LICENSE_IMAGE_FOLDER};
use crate::domain::accounts::Account;
use crate::domain::licenses::DriverLicense;
use crate::domain::licenses::license::is_seasoned;
use crate::domain::licenses::ocr_parser::{LicenseParseError, parse_back, parse_front};

const TOO_NEW: &str =
    "1 year must pass after you get your driver's license before you can rent a car.";

pub struct LicenseScans {
    pub front_side: ImageUpload,
    pub back_side: ImageUpload,
}

/// Reads both sides of the card, checks the issue date and stores the result.
pub struct CreateDriverLicense<'a, L, O, C>
where
    L: DriverLicenseRepository + ?Sized,
    O: OcrEngine + ?Sized,
    C: ImageCdn + ?Sized,
{
    pub licenses: &'a L,
    pub ocr: &'a O,
    pub cdn: &'a C,
}

impl<'a, L, O, C> CreateDriverLicense<'a, L, O, C>
where
    L: DriverLicenseRepository + ?Sized,
    O: OcrEngine + ?Sized,
    C: ImageCdn + ?Sized,
{
    pub async fn execute(
        &self,
        renter: &Account,
        scans: &LicenseScans,
        today: NaiveDate,
    ) -> ServiceResult<DriverLicense> {
        for (field, img) in [("frontSide", &scans.front_side), ("backSide", &scans.back_side)] {
            if !img.content_type.as_deref().is_some_and(|ct| ct.starts_with("image/")) {
                return Err(ServiceError::bad_request(format!("{field} must be an image file")));
            }
        }
        if self.licenses.find_by_renter(renter.id).await?.is_some() {
            return Err(ServiceError::conflict(LICENSE_EXISTS));
        }

        let front_text = self.ocr.recognize(&scans.front_side).await?;
        let back_text = self.ocr.recognize(&scans.back_side).await?;
        let bad_scan = |e: LicenseParseError| {
            tracing::debug!(error = %e, renter = %renter.account_code, "license_scan_unreadable");
            ServiceError::bad_request(e.to_string())
        };
        let front = parse_front(&front_text).map_err(bad_scan)?;
        let blood_group = parse_back(&back_text).map_err(bad_scan)?;

        if !is_seasoned(front.drivers_license_date, today) {
            return Err(ServiceError::bad_request(TOO_NEW));
        }

        let front_side_image = self.store_scan(renter, &scans.front_side).await?;
        let back_side_image = match self.store_scan(renter, &scans.back_side).await {
            Ok(url) => url,
            Err(err) => {
                self.discard_scans(&[front_side_image.as_str()]).await;
                return Err(err.into());
            }
        };

        let created = self
            .licenses
            .create(&NewDriverLicense {
                renter_id: renter.id,
                first_name: front.first_name,
                last_name: front.last_name,
                born_date: front.born_date,
                born_place: front.born_place,
                drivers_license_date: front.drivers_license_date,
                licence_validity_period: front.licence_validity_period,
                identity_number: front.identity_number,
                blood_group,
                front_side_image: front_side_image.clone(),
                back_side_image: back_side_image.clone(),
            })
            .await;
        let err = match created {
            Ok(license) => {
                tracing::info!(renter = %renter.account_code, "driver_license_created");
                return Ok(license);
            }
            Err(err) => err,
        };
        self.discard_scans(&[front_side_image.as_str(), back_side_image.as_str()])
            .await;
        if let Some(ConstraintViolation::Unique(_)) = err.downcast_ref::<ConstraintViolation>() {
            return Err(ServiceError::conflict(LICENSE_EXISTS));
        }
        Err(err.into())
    }

    /// Uploaded scans that no stored license points to are removed best-effort.
    async fn discard_scans(&self, urls: &[&str]) {
        for url in urls {
            if let Err(err) = self.cdn.delete(url).await {
                tracing::warn!(error = ?err, url = %url, "license_image_delete_failed");
            }
        }
    }

    async fn store_scan(&self, renter: &Account, image: &ImageUpload) -> anyhow::Result<String> {
        let public_id = format!(
            "{}--{}-{}",
            image.stem(),
            renter.account_code,
            ids::alphanumeric(8)
        );
        self.cdn.upload(LICENSE_IMAGE_FOLDER, &public_id, image).await
    }
}
