//! Photo gallery.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use super::{deleted, ApiPath, ApiQuery, MultipartForm, PortalState};
use crate::auth::{AuthUser, EDITOR_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::models::gallery::{GalleryImage, NewGalleryImage};
use crate::services::gallery_service;
use crate::storage::{validate_upload, UploadKind};
use crate::validation;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;
const DEFAULT_CATEGORY: &str = "general";

pub fn router() -> Router<PortalState> {
    Router::new()
        .route("/gallery", get(list_images).post(upload_image))
        .route("/gallery/{id}", get(get_image).delete(delete_image))
}

#[derive(Deserialize)]
pub struct GalleryQuery {
    pub category: Option<String>,
    pub limit: Option<i64>,
}

async fn list_images(
    State(state): State<PortalState>,
    ApiQuery(query): ApiQuery<GalleryQuery>,
) -> ApiResult<Json<Vec<GalleryImage>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let category = validation::optional(query.category);
    let mut conn = state.conn().await?;
    let images = gallery_service::list_images(&mut conn, category.as_deref(), limit).await?;
    Ok(Json(images))
}

async fn get_image(
    State(state): State<PortalState>,
    ApiPath(image_id): ApiPath<i64>,
) -> ApiResult<Json<GalleryImage>> {
    let mut conn = state.conn().await?;
    gallery_service::get_image(&mut conn, image_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("image"))
}

/// Multipart: `file`, `title`, optional `caption` and `category`.
async fn upload_image(
    State(state): State<PortalState>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<GalleryImage>)> {
    auth.require(EDITOR_ROLES)?;
    let mut form = MultipartForm::read(multipart?, "file").await?;
    let title = validation::required("title", form.text("title"))?;
    let caption = form.optional("caption");
    let category = form
        .optional("category")
        .map(|c| c.to_lowercase())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let file = form.require_file("file")?;
    let key = validate_upload(UploadKind::Gallery, &file, state.config.max_upload_bytes)?;

    let url = state.media.put(&key, &file.data, &file.content_type).await?;
    crate::metrics::upload_stored(UploadKind::Gallery.prefix(), file.data.len());

    let mut conn = state.conn().await?;
    let created = gallery_service::create_image(
        &mut conn,
        NewGalleryImage {
            title,
            caption,
            category,
            storage_key: key.clone(),
            url,
            content_type: file.content_type.to_ascii_lowercase(),
            size_bytes: file.data.len() as i64,
            uploaded_by: Some(auth.id()),
        },
    )
    .await;
    match created {
        Ok(image) => Ok((StatusCode::CREATED, Json(image))),
        Err(e) => {
            if let Err(err) = state.media.delete(&key).await {
                tracing::warn!(key = %key, "Failed to remove orphaned upload: {err}");
            }
            Err(e.into())
        }
    }
}

/// Removes the row, then the stored object.
async fn delete_image(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(image_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    auth.require(EDITOR_ROLES)?;
    let mut conn = state.conn().await?;
    let removed = gallery_service::delete_image(&mut conn, image_id).await?;
    drop(conn);

    if let Some(image) = &removed {
        if let Err(e) = state.media.delete(&image.storage_key).await {
            tracing::warn!(key = %image.storage_key, "Stored object not removed: {e}");
        }
    }
    deleted("image", removed.is_some())
}
