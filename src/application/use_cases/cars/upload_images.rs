use std::collections::BTreeSet;

use crate::application::errors::{ServiceError, ServiceResult};
use crate::application::ports::image_cdn::{ImageCdn, ImageUpload};
use crate::application::services::ids;
use crate::domain::accounts::Account;
use crate::domain::cars::CarImageSide;

pub const CAR_IMAGE_FOLDER: &str = "cars";

/// Multipart images keyed by the side of the car they show.
pub type SideImages = Vec<(CarImageSide, ImageUpload)>;

/// Rejects empty batches, repeated sides and non-image parts.
pub(crate) fn check_side_images(images: &SideImages) -> ServiceResult<()> {
    if images.is_empty() {
        return Err(ServiceError::bad_request("You should send at least one image"));
    }
    let mut seen = BTreeSet::new();
    for (side, image) in images {
        if !seen.insert(*side) {
            return Err(ServiceError::bad_request(format!(
                "{} can only be sent once",
                side.field_name()
            )));
        }
        let is_image = image
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(ServiceError::bad_request(format!(
                "{} must be an image file",
                side.field_name()
            )));
        }
    }
    Ok(())
}

/// Uploads in the given order and returns the public URLs in the same order.
pub(crate) async fn upload_side_images<C: ImageCdn + ?Sized>(
    cdn: &C,
    folder: &str,
    owner_code: &str,
    images: &SideImages,
) -> anyhow::Result<Vec<String>> {
    let mut urls = Vec::with_capacity(images.len());
    for (_, image) in images {
        let public_id = format!("{}--{}-{}", image.stem(), owner_code, ids::alphanumeric(8));
        urls.push(cdn.upload(folder, &public_id, image).await?);
    }
    Ok(urls)
}

/// Pushes photos to the CDN ahead of `add car details`; nothing is stored yet.
pub struct UploadCarImages<'a, C: ImageCdn + ?Sized> {
    pub cdn: &'a C,
}

impl<'a, C: ImageCdn + ?Sized> UploadCarImages<'a, C> {
    pub async fn execute(&self, owner: &Account, images: &SideImages) -> ServiceResult<Vec<String>> {
        check_side_images(images)?;
        let urls =
            upload_side_images(self.cdn, CAR_IMAGE_FOLDER, &owner.account_code, images).await?;
        tracing::debug!(owner = %owner.account_code, count = urls.len(), "car_images_uploaded");
        Ok(urls)
    }
}
