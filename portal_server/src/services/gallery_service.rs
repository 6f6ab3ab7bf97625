//! Gallery image records. Stored bytes live in the media store.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::gallery::{GalleryImage, NewGalleryImage};
use crate::schema::gallery_images;

pub async fn list_images(
    conn: &mut AsyncPgConnection,
    category: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<GalleryImage>> {
    let mut query = gallery_images::table
        .order(gallery_images::id.desc())
        .limit(limit)
        .into_boxed();
    if let Some(category) = category {
        query = query.filter(gallery_images::category.eq(category.to_string()));
    }
    let results = query.load::<GalleryImage>(conn).await?;
    Ok(results)
}

pub async fn get_image(conn: &mut AsyncPgConnection, image_id: i64) -> anyhow::Result<Option<GalleryImage>> {
    let result = gallery_images::table
        .find(image_id)
        .first::<GalleryImage>(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn create_image(conn: &mut AsyncPgConnection, new_image: NewGalleryImage) -> anyhow::Result<GalleryImage> {
    let result = diesel::insert_into(gallery_images::table)
        .values(&new_image)
        .get_result::<GalleryImage>(conn)
        .await?;
    tracing::info!(image_id = result.id, key = %result.storage_key, "Gallery image stored");
    Ok(result)
}

/// Delete the row and return it so the caller can remove the stored object.
pub async fn delete_image(conn: &mut AsyncPgConnection, image_id: i64) -> anyhow::Result<Option<GalleryImage>> {
    let result = diesel::delete(gallery_images::table.find(image_id))
        .get_result::<GalleryImage>(conn)
        .await
        .optional()?;
    Ok(result)
}
