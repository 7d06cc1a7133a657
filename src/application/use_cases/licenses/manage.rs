use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::driver_license_repository::DriverLicenseRepository;
use crate::application::ports::image_cdn::ImageCdn;
use crate::application::use_cases::licenses::LICENSE_NOT_FOUND;
use crate::domain::accounts::Account;
use crate::domain::licenses::DriverLicense;

pub struct GetDriverLicense<'a, L: DriverLicenseRepository + ?Sized> {
    pub licenses: &'a L,
}

impl<'a, L: DriverLicenseRepository + ?Sized> GetDriverLicense<'a, L> {
    pub async fn execute(&self, renter: &Account) -> ServiceResult<DriverLicense> {
        self.licenses
            .find_by_renter(renter.id)
            .await?
            .ok_or_else(|| ServiceError::not_found(LICENSE_NOT_FOUND))
    }
}

pub struct DeleteDriverLicense<'a, L, C>
where
    L: DriverLicenseRepository + ?Sized,
    C: ImageCdn + ?Sized,
{
    pub licenses: &'a L,
    pub cdn: &'a C,
}

impl<'a, L, C> DeleteDriverLicense<'a, L, C>
where
    L: DriverLicenseRepository + ?Sized,
    C: ImageCdn + ?Sized,
{
    pub async fn execute(&self, renter: &Account) -> ServiceResult<()> {
        let license = GetDriverLicense {
            licenses: self.licenses,
        }
        .execute(renter)
        .await?;
        if !self.licenses.delete_by_renter(renter.id).await? {
            return Err(ServiceError::not_found(LICENSE_NOT_FOUND));
        }
        // Scans are removed best-effort once the row is gone.
        for url in [&license.front_side_image, &license.back_side_image] {
            if let Err(err) = self.cdn.delete(url).await {
                tracing::warn!(error = ?err, url = %url, "license_image_delete_failed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeCdn, MemoryDb, sample_license};
    use crate::domain::accounts::Role;
    use crate::domain::accounts::account::sample_account;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn get_and_delete_own_license() {
        let db = MemoryDb::new();
        let cdn = FakeCdn::default();
        let renter = sample_account(Role::Renter);
        let issued = NaiveDate::from_ymd_opt(2015, 6, 5).unwrap();
        let valid = NaiveDate::from_ymd_opt(2035, 6, 5).unwrap();
        db.insert_license(sample_license(renter.id, issued, valid));

        let got = GetDriverLicense { licenses: &db }.execute(&renter).await.unwrap();
        assert_eq!(got.renter_id, renter.id);

        let uc = DeleteDriverLicense {
            licenses: &db,
            cdn: &cdn,
        };
        uc.execute(&renter).await.unwrap();
        assert_eq!(cdn.deleted().len(), 2);
        assert!(matches!(
            uc.execute(&renter).await,
            Err(ServiceError::NotFound(m)) if m == LICENSE_NOT_FOUND
        ));
    }
}
