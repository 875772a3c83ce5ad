use chrono::Utc;
use uuid::Uuid;

use super::{is_http_url, non_blank};
use crate::database::models::{GalleryImage, GalleryImageInput, GalleryImagePatch};
use crate::database::Store;
use crate::error::{ApiError, ValidationErrors};

/// Gallery names are URL slugs such as `hero` or `lookbook`.
pub fn is_gallery_slug(gallery: &str) -> bool {
    !gallery.is_empty()
        && gallery.len() <= 50
        && gallery
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn check_gallery(gallery: &str) -> Result<(), ApiError> {
    if is_gallery_slug(gallery) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!("Nom de galerie invalide : {}", gallery)))
    }
}

fn validate_image(image: &GalleryImage) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(
        is_http_url(&image.image_url),
        "image_url",
        "L'image doit être une URL http(s)",
    );
    errors.check(image.position >= 0, "position", "La position ne peut pas être négative");
    errors.into_result()
}

pub async fn list(store: &dyn Store, gallery: &str, active_only: bool) -> Result<Vec<GalleryImage>, ApiError> {
    check_gallery(gallery)?;
    Ok(store.list_gallery(gallery, active_only).await?)
}

/// Appends to the end of the gallery unless a position is given.
pub async fn add_image(store: &dyn Store, gallery: &str, input: GalleryImageInput) -> Result<GalleryImage, ApiError> {
    check_gallery(gallery)?;
    let position = match input.position {
        Some(position) => position,
        None => store
            .list_gallery(gallery, false)
            .await?
            .iter()
            .map(|image| image.position + 1)
            .max()
            .unwrap_or(0),
    };

    let image = GalleryImage {
        id: Uuid::new_v4(),
        gallery: gallery.to_string(),
        title: non_blank(input.title.as_deref()),
        image_url: input.image_url.trim().to_string(),
        alt: non_blank(input.alt.as_deref()),
        position,
        is_active: input.is_active,
        created_at: Utc::now(),
    };
    validate_image(&image)?;
    Ok(store.insert_gallery_image(&image).await?)
}

pub async fn update_image(store: &dyn Store, id: Uuid, patch: GalleryImagePatch) -> Result<GalleryImage, ApiError> {
    let mut image = store.get_gallery_image(id).await?;
    patch.apply(&mut image);
    image.image_url = image.image_url.trim().to_string();
    validate_image(&image)?;
    Ok(store.update_gallery_image(&image).await?)
}

/// `ids` lists every image of the gallery in the new display order.
pub async fn reorder(store: &dyn Store, gallery: &str, ids: &[Uuid]) -> Result<Vec<GalleryImage>, ApiError> {
    check_gallery(gallery)?;
    let current = store.list_gallery(gallery, false).await?;
    let mut given = ids.to_vec();
    given.sort();
    given.dedup();
    if given.len() != ids.len() || given.len() != current.len() {
        return Err(ApiError::bad_request("Reorder must list each image of the gallery exactly once"));
    }
    Ok(store.reorder_gallery(gallery, ids).await?)
}
