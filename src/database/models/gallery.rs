use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::double_option;

/// An image shown in one of the storefront galleries (`hero`, `lookbook`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GalleryImage {
    pub id: Uuid,
    pub gallery: String,
    pub title: Option<String>,
    pub image_url: String,
    pub alt: Option<String>,
    pub position: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GalleryImageInput {
    pub title: Option<String>,
    pub image_url: String,
    pub alt: Option<String>,
    pub position: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryImagePatch {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub alt: Option<Option<String>>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}

impl GalleryImagePatch {
    pub fn apply(self, image: &mut GalleryImage) {
        if let Some(title) = self.title {
            image.title = title;
        }
        if let Some(image_url) = self.image_url {
            image.image_url = image_url;
        }
        if let Some(alt) = self.alt {
            image.alt = alt;
        }
        if let Some(position) = self.position {
            image.position = position;
        }
        if let Some(is_active) = self.is_active {
            image.is_active = is_active;
        }
    }
}
