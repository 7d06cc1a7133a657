use axum::extract::Multipart;

use crate::application::ports::image_cdn::ImageUpload;
use crate::application::use_cases::cars::upload_images::SideImages;
use crate::application::use_cases::licenses::create::LicenseScans;
use crate::domain::cars::CarImageSide;
use crate::presentation::http::error::ApiError;

/// Reads every file part of the form. Parts whose name is not in `accepted`
/// are rejected the way the upload middleware of the web tier rejects them.
async fn file_parts(
    multipart: &mut Multipart,
    accepted: &[&str],
    max_bytes: usize,
) -> Result<Vec<(String, ImageUpload)>, ApiError> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if !accepted.contains(&name.as_str()) {
            return Err(ApiError::bad_request(format!("Unexpected field {name}")));
        }
        let file_name = field.file_name().unwrap_or(name.as_str()).to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        if bytes.len() > max_bytes {
            return Err(ApiError::bad_request(format!("{name} is too large")));
        }
        parts.push((
            name,
            ImageUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            },
        ));
    }
    Ok(parts)
}

pub async fn side_images(mut multipart: Multipart, max_bytes: usize) -> Result<SideImages, ApiError> {
    let names = CarImageSide::ALL.map(|s| s.field_name());
    let parts = file_parts(&mut multipart, &names, max_bytes).await?;
    Ok(parts
        .into_iter()
        .filter_map(|(name, upload)| CarImageSide::from_field(&name).map(|side| (side, upload)))
        .collect())
}

pub async fn license_scans(mut multipart: Multipart, max_bytes: usize) -> Result<LicenseScans, ApiError> {
    let parts = file_parts(&mut multipart, &["frontSide", "backSide"], max_bytes).await?;
    let mut front_side = None;
    let mut back_side = None;
    for (name, upload) in parts {
        let slot = if name == "frontSide" { &mut front_side } else { &mut back_side };
        if slot.replace(upload).is_some() {
            return Err(ApiError::bad_request(format!("{name} can only be sent once")));
        }
    }
    match (front_side, back_side) {
        (Some(front_side), Some(back_side)) => Ok(LicenseScans {
            front_side,
            back_side,
        }),
        _ => Err(ApiError::bad_request(
            "You should send frontSide and backSide images of your driver license",
        )),
    }
}
