//! Portal HTTP routes.
//!
//! Handlers stay thin: authorize, validate the request, check out a
//! connection, call the service, wrap the result in JSON. Validation happens
//! before a connection is taken so bad requests never touch the pool.

pub mod account;
pub mod careers;
pub mod dashboard;
pub mod fees;
pub mod gallery;
pub mod guidance;
pub mod portal;
pub mod registrations;
pub mod results;
pub mod school_info;
pub mod staff;
pub mod subscribers;
pub mod testimonials;
pub mod uploads;
pub mod users;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::multipart::Multipart;
use axum::extract::{DefaultBodyLimit, FromRequest, FromRequestParts};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};

use crate::config::PortalConfig;
use crate::db::{DbConn, DbPool};
use crate::error::{ApiError, ApiResult};
use crate::mail::{Mailer, OutgoingMail};
use crate::storage::{MediaStore, UploadedFile};

/// Headroom over the upload limit for the other multipart fields.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state for portal route handlers.
#[derive(Clone)]
pub struct PortalState {
    pub pool: DbPool,
    pub config: Arc<PortalConfig>,
    pub mailer: Arc<dyn Mailer>,
    pub media: Arc<dyn MediaStore>,
}

impl PortalState {
    pub async fn conn(&self) -> ApiResult<DbConn> {
        self.pool
            .get()
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("diesel pool: {e}")))
    }

    /// Send mail where delivery failure must not fail the request.
    pub async fn send_best_effort(&self, mail: OutgoingMail) {
        let kind = mail.kind;
        let to = mail.to.clone();
        if let Err(e) = self.mailer.send(mail).await {
            tracing::warn!(kind, to = %to, "Mail delivery failed: {e:#}");
        }
    }

    /// Notify the school office, if an inbox is configured.
    pub async fn notify_office(&self, subject: String, body: String) {
        if self.config.school_notify_email.is_empty() {
            return;
        }
        let mail = crate::mail::office_notification(&self.config.school_notify_email, subject, body);
        self.send_best_effort(mail).await;
    }
}

/// JSON body extractor whose rejections use the API error format.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `{"message": "..."}`.
pub fn message(text: impl Into<String>) -> Json<Value> {
    Json(json!({ "message": text.into() }))
}

/// 404 unless a row was deleted.
pub fn deleted(what: &str, removed: bool) -> ApiResult<Json<Value>> {
    if removed {
        Ok(message(format!("{what} deleted")))
    } else {
        Err(ApiError::not_found(what))
    }
}

pub async fn hash_password(password: String) -> ApiResult<String> {
    let hash = tokio::task::spawn_blocking(move || crate::auth::hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.into()))??;
    Ok(hash)
}

pub async fn verify_password(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || crate::auth::verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(e.into()))
}

/// Text fields and the single file part of a multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MultipartForm {
    /// Read every part; the part named `file_field` is kept as bytes.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> ApiResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == file_field {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await?.to_vec();
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn optional(&self, name: &str) -> Option<String> {
        crate::validation::optional(self.fields.get(name).cloned())
    }

    pub fn require_file(&mut self, name: &str) -> ApiResult<UploadedFile> {
        self.file
            .take()
            .ok_or_else(|| ApiError::validation(format!("{name} is required")))
    }
}

/// Build the portal router: `/health` plus everything under `/api`.
pub fn portal_router(state: PortalState) -> Router {
    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;
    let api = Router::new()
        .merge(account::router())
        .merge(users::router())
        .merge(careers::router())
        .merge(gallery::router())
        .merge(guidance::router())
        .merge(registrations::router())
        .merge(school_info::router())
        .merge(results::router())
        .merge(fees::router())
        .merge(subscribers::router())
        .merge(testimonials::router())
        .merge(staff::router())
        .merge(uploads::router())
        .merge(portal::router())
        .merge(dashboard::router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
