//! Guidance and counseling calendar.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::Value;

use super::{deleted, ApiJson, ApiPath, ApiQuery, PortalState};
use crate::auth::{AuthUser, EDITOR_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::models::counseling::{CounselingEvent, CounselingEventChanges, NewCounselingEvent};
use crate::services::counseling_service;
use crate::validation;

pub const AUDIENCES: &[&str] = &["all", "students", "parents", "staff"];

pub fn router() -> Router<PortalState> {
    Router::new()
        .route("/guidance", get(list_events).post(create_event))
        .route("/guidance/{id}", get(get_event).put(update_event).delete(delete_event))
}

fn check_times(start: Option<NaiveTime>, end: Option<NaiveTime>) -> ApiResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(ApiError::validation("end_time must be after start_time"));
        }
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct EventQuery {
    #[serde(default)]
    pub upcoming: bool,
    pub audience: Option<String>,
}

async fn list_events(
    State(state): State<PortalState>,
    ApiQuery(query): ApiQuery<EventQuery>,
) -> ApiResult<Json<Vec<CounselingEvent>>> {
    let audience = query
        .audience
        .as_deref()
        .map(|a| validation::one_of("audience", a, AUDIENCES))
        .transpose()?;
    let mut conn = state.conn().await?;
    let events = counseling_service::list_events(&mut conn, query.upcoming, audience.as_deref()).await?;
    Ok(Json(events))
}

async fn get_event(
    State(state): State<PortalState>,
    ApiPath(event_id): ApiPath<i64>,
) -> ApiResult<Json<CounselingEvent>> {
    let mut conn = state.conn().await?;
    counseling_service::get_event(&mut conn, event_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("event"))
}

async fn create_event(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiJson(mut event): ApiJson<NewCounselingEvent>,
) -> ApiResult<(StatusCode, Json<CounselingEvent>)> {
    auth.require(EDITOR_ROLES)?;
    event.title = validation::required("title", &event.title)?;
    event.description = validation::required("description", &event.description)?;
    event.audience = validation::one_of("audience", &event.audience, AUDIENCES)?;
    event.counselor = validation::optional(event.counselor);
    event.location = validation::optional(event.location);
    check_times(event.start_time, event.end_time)?;

    let mut conn = state.conn().await?;
    let created = counseling_service::create_event(&mut conn, event).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_event(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(event_id): ApiPath<i64>,
    ApiJson(mut changes): ApiJson<CounselingEventChanges>,
) -> ApiResult<Json<CounselingEvent>> {
    auth.require(EDITOR_ROLES)?;
    if let Some(title) = changes.title.take() {
        changes.title = Some(validation::required("title", &title)?);
    }
    if let Some(description) = changes.description.take() {
        changes.description = Some(validation::required("description", &description)?);
    }
    if let Some(audience) = changes.audience.take() {
        changes.audience = Some(validation::one_of("audience", &audience, AUDIENCES)?);
    }

    let mut conn = state.conn().await?;
    let current = counseling_service::get_event(&mut conn, event_id)
        .await?
        .ok_or_else(|| ApiError::not_found("event"))?;
    check_times(
        changes.start_time.or(current.start_time),
        changes.end_time.or(current.end_time),
    )?;
    let updated = counseling_service::update_event(&mut conn, event_id, changes).await?;
    Ok(Json(updated))
}

async fn delete_event(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(event_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    auth.require(EDITOR_ROLES)?;
    let mut conn = state.conn().await?;
    let removed = counseling_service::delete_event(&mut conn, event_id).await?;
    deleted("event", removed)
}
