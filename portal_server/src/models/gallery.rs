//! gallery_images: uploaded photos shown on the public gallery.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::gallery_images;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = gallery_images)]
pub struct GalleryImage {
    pub id: i64,
    pub title: String,
    pub caption: Option<String>,
    pub category: String,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = gallery_images)]
pub struct NewGalleryImage {
    pub title: String,
    pub caption: Option<String>,
    pub category: String,
    pub storage_key: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<i64>,
}
