//! Admission applications.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, put};
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::{deleted, ApiJson, ApiPath, ApiQuery, PortalState};
use crate::auth::{AuthUser, ADMIN_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::models::registration::{NewRegistration, Registration};
use crate::services::registration_service::{self, GENDERS, STATUSES};
use crate::validation;

pub fn router() -> Router<PortalState> {
    Router::new()
        .route("/registrations", get(list_registrations).post(submit_registration))
        .route(
            "/registrations/{id}",
            get(get_registration).delete(delete_registration),
        )
        .route("/registrations/{id}/status", put(update_status))
}

#[derive(Deserialize)]
pub struct RegistrationRequest {
    pub student_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub grade_applying: String,
    pub previous_school: Option<String>,
    pub parent_name: String,
    pub parent_email: String,
    pub parent_phone: String,
    pub notes: Option<String>,
}

impl RegistrationRequest {
    fn validate(self, today: NaiveDate) -> ApiResult<NewRegistration> {
        if self.date_of_birth >= today {
            return Err(ApiError::validation("date_of_birth must be in the past"));
        }
        Ok(NewRegistration {
            student_name: validation::required("student_name", &self.student_name)?,
            date_of_birth: self.date_of_birth,
            gender: validation::one_of("gender", &self.gender.to_lowercase(), GENDERS)?,
            grade_applying: validation::required("grade_applying", &self.grade_applying)?,
            previous_school: validation::optional(self.previous_school),
            parent_name: validation::required("parent_name", &self.parent_name)?,
            parent_email: validation::email("parent_email", &self.parent_email)?,
            parent_phone: validation::phone("parent_phone", &self.parent_phone)?,
            notes: validation::optional(self.notes),
            status: "pending".to_string(),
        })
    }
}

async fn submit_registration(
    State(state): State<PortalState>,
    ApiJson(req): ApiJson<RegistrationRequest>,
) -> ApiResult<(StatusCode, Json<Registration>)> {
    let new_registration = req.validate(chrono::Utc::now().date_naive())?;
    let mut conn = state.conn().await?;
    let registration = registration_service::create_registration(&mut conn, new_registration).await?;
    drop(conn);

    state
        .send_best_effort(crate::mail::registration_received(
            &registration.parent_email,
            &registration.parent_name,
            &registration.student_name,
            registration.id,
        ))
        .await;
    state
        .notify_office(
            format!("New admission application: {}", registration.student_name),
            format!(
                "{} applied for {} (registration #{}). Parent: {} <{}>, {}.",
                registration.student_name,
                registration.grade_applying,
                registration.id,
                registration.parent_name,
                registration.parent_email,
                registration.parent_phone
            ),
        )
        .await;
    Ok((StatusCode::CREATED, Json(registration)))
}

#[derive(Deserialize)]
pub struct RegistrationQuery {
    pub status: Option<String>,
}

async fn list_registrations(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<RegistrationQuery>,
) -> ApiResult<Json<Vec<Registration>>> {
    auth.require(ADMIN_ROLES)?;
    let status = query
        .status
        .as_deref()
        .map(|s| validation::one_of("status", s, STATUSES))
        .transpose()?;
    let mut conn = state.conn().await?;
    let registrations = registration_service::list_registrations(&mut conn, status.as_deref()).await?;
    Ok(Json(registrations))
}

async fn get_registration(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(registration_id): ApiPath<i64>,
) -> ApiResult<Json<Registration>> {
    auth.require(ADMIN_ROLES)?;
    let mut conn = state.conn().await?;
    registration_service::get_registration(&mut conn, registration_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("registration"))
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Moves the application along and tells the parent.
async fn update_status(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(registration_id): ApiPath<i64>,
    ApiJson(req): ApiJson<StatusUpdate>,
) -> ApiResult<Json<Registration>> {
    auth.require(ADMIN_ROLES)?;
    let status = validation::one_of("status", &req.status, STATUSES)?;
    let mut conn = state.conn().await?;
    let registration = registration_service::update_status(&mut conn, registration_id, &status).await?;
    drop(conn);

    state
        .send_best_effort(crate::mail::registration_decision(
            &registration.parent_email,
            &registration.parent_name,
            &registration.student_name,
            &registration.status,
            registration.admission_number.as_deref(),
        ))
        .await;
    Ok(Json(registration))
}

async fn delete_registration(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(registration_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    auth.require(ADMIN_ROLES)?;
    let mut conn = state.conn().await?;
    let removed = registration_service::delete_registration(&mut conn, registration_id).await?;
    deleted("registration", removed)
}
