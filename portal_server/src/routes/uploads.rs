//! Free-standing media uploads for page content (images and PDFs).

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde::Serialize;

use super::{MultipartForm, PortalState};
use crate::auth::{AuthUser, EDITOR_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::storage::{validate_upload, UploadKind};

pub fn router() -> Router<PortalState> {
    Router::new().route("/uploads", post(upload))
}

#[derive(Debug, Serialize)]
pub struct StoredUpload {
    pub key: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: usize,
}

fn kind_from(value: Option<&str>) -> ApiResult<UploadKind> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("image") => Ok(UploadKind::PageImage),
        Some("document") => Ok(UploadKind::Resume),
        Some(other) => Err(ApiError::validation(format!(
            "kind must be one of: image, document (got {other})"
        ))),
    }
}

/// Multipart: `file` and optional `kind` (`image` or `document`).
async fn upload(
    State(state): State<PortalState>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<StoredUpload>)> {
    auth.require(EDITOR_ROLES)?;
    let mut form = MultipartForm::read(multipart?, "file").await?;
    let kind = kind_from(form.optional("kind").as_deref())?;
    let file = form.require_file("file")?;
    let key = validate_upload(kind, &file, state.config.max_upload_bytes)?;

    let content_type = file.content_type.to_ascii_lowercase();
    let url = state.media.put(&key, &file.data, &content_type).await?;
    crate::metrics::upload_stored(kind.prefix(), file.data.len());
    tracing::info!(key = %key, by = auth.id(), size = file.data.len(), "Upload stored");

    Ok((
        StatusCode::CREATED,
        Json(StoredUpload {
            key,
            url,
            content_type,
            size_bytes: file.data.len(),
        }),
    ))
}
