use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::car_repository::CarRepository;
use crate::application::ports::image_cdn::ImageCdn;
use crate::application::ports::rental_repository::RentalRepository;
use crate::application::use_cases::cars::upload_images::{
    CAR_IMAGE_FOLDER, SideImages, check_side_images, upload_side_images,
};
use crate::application::use_cases::rentals::own_active_rental;
use crate::domain::accounts::Account;
use crate::domain::cars::CarImageSide;

pub const ALL_SIDES_REQUIRED: &str =
    "You should send 5 images. frontSide, backSide, rightSide, leftSide, inside";

/// Renter's photos of the car at hand-back; they replace the listing photos.
pub struct UploadStatusImages<'a, R, C, D>
where
    R: RentalRepository + ?Sized,
    C: CarRepository + ?Sized,
    D: ImageCdn + ?Sized,
{
    pub rentals: &'a R,
    pub cars: &'a C,
    pub cdn: &'a D,
}

impl<'a, R, C, D> UploadStatusImages<'a, R, C, D>
where
    R: RentalRepository + ?Sized,
    C: CarRepository + ?Sized,
    D: ImageCdn + ?Sized,
{
    pub async fn execute(
        &self,
        renter: &Account,
        rental_code: &str,
        images: &SideImages,
    ) -> ServiceResult<Vec<String>> {
        if images.len() != CarImageSide::ALL.len() {
            return Err(ServiceError::bad_request(ALL_SIDES_REQUIRED));
        }
        check_side_images(images)?;
        let rental = own_active_rental(self.rentals, renter, rental_code).await?;

        let mut ordered = images.clone();
        ordered.sort_by_key(|(side, _)| *side);
        let urls =
            upload_side_images(self.cdn, CAR_IMAGE_FOLDER, &renter.account_code, &ordered).await?;

        let replaced = self.cars.replace_images(rental.car_id, &urls).await?;
        self.rentals.mark_images_uploaded(rental.id).await?;
        for url in replaced {
            if let Err(err) = self.cdn.delete(&url).await {
                tracing::warn!(error = ?err, url = %url, "car_image_delete_failed");
            }
        }
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeCdn, MemoryDb, image};
    use crate::application::use_cases::rentals::{ALREADY_TERMINATED, WRONG_RENTAL_CODE};
    use crate::domain::accounts::Role;
    use crate::domain::accounts::account::sample_account;
    use crate::domain::cars::car::sample_car;
    use crate::domain::rentals::{PaymentStatus, RentStatus, RentType, Rental};
    use chrono::Utc;
    use uuid::Uuid;

    fn all_sides() -> SideImages {
        CarImageSide::ALL
            .into_iter()
            .rev()
            .map(|s| (s, image(&format!("{}.jpg", s.field_name()))))
            .collect()
    }

    fn rented(db: &MemoryDb, renter: &Account) -> Rental {
        let mut car = sample_car(Uuid::new_v4());
        car.is_rentable = false;
        car.images = vec!["https://cdn.test/cars/old".into()];
        let rental = Rental {
            id: Uuid::new_v4(),
            rental_code: "5555444433332222".into(),
            renter_id: renter.id,
            car_id: car.id,
            rent_type: RentType::Minute,
            starting_date: Utc::now(),
            ending_date: None,
            total_fee: None,
            rent_status: RentStatus::Active,
            payment_status: PaymentStatus::Pending,
            is_images_uploaded: false,
            created_at: Utc::now(),
        };
        db.insert_car(car);
        db.insert_rental(rental.clone());
        rental
    }

    #[tokio::test]
    async fn replaces_car_photos_in_side_order() {
        let db = MemoryDb::new();
        let cdn = FakeCdn::default();
        let renter = sample_account(Role::Renter);
        let rental = rented(&db, &renter);
        let urls = UploadStatusImages {
            rentals: &db,
            cars: &db,
            cdn: &cdn,
        }
        .execute(&renter, &rental.rental_code, &all_sides())
        .await
        .unwrap();
        assert_eq!(urls.len(), 5);
        assert!(urls[0].contains("/cars/frontSide--"));
        assert!(urls[4].contains("/cars/inside--"));
        assert_eq!(db.car(rental.car_id).unwrap().images, urls);
        assert!(db.rental(&rental.rental_code).unwrap().is_images_uploaded);
        assert_eq!(cdn.deleted(), vec!["https://cdn.test/cars/old".to_string()]);
    }

    #[tokio::test]
    async fn needs_every_side_and_own_active_rental() {
        let db = MemoryDb::new();
        let cdn = FakeCdn::default();
        let renter = sample_account(Role::Renter);
        let rental = rented(&db, &renter);
        let uc = UploadStatusImages {
            rentals: &db,
            cars: &db,
            cdn: &cdn,
        };

        let mut four = all_sides();
        four.pop();
        assert!(matches!(
            uc.execute(&renter, &rental.rental_code, &four).await,
            Err(ServiceError::BadRequest(m)) if m == ALL_SIDES_REQUIRED
        ));

        let stranger = sample_account(Role::Renter);
        assert!(matches!(
            uc.execute(&stranger, &rental.rental_code, &all_sides()).await,
            Err(ServiceError::BadRequest(m)) if m == WRONG_RENTAL_CODE
        ));

        db.update_rental(&rental.rental_code, |r| r.rent_status = RentStatus::Terminated);
        assert!(matches!(
            uc.execute(&renter, &rental.rental_code, &all_sides()).await,
            Err(ServiceError::BadRequest(m)) if m == ALREADY_TERMINATED
        ));
        assert!(cdn.uploaded().is_empty());
    }
}
