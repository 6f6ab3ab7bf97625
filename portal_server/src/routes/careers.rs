//! Career vacancies and job applications.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, put};
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::{deleted, ApiJson, ApiPath, ApiQuery, MultipartForm, PortalState};
use crate::auth::{AuthUser, EDITOR_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::models::career::{CareerApplication, CareerJob, CareerJobChanges, NewCareerApplication, NewCareerJob};
use crate::services::career_service::{self, APPLICATION_STATUSES, EMPLOYMENT_TYPES};
use crate::storage::{validate_upload, UploadKind};
use crate::validation;

pub fn router() -> Router<PortalState> {
    Router::new()
        .route("/careers", get(list_jobs).post(create_job))
        .route("/careers/{id}", get(get_job).put(update_job).delete(delete_job))
        .route(
            "/careers/{id}/applications",
            get(list_applications).post(submit_application),
        )
        .route("/careers/applications/{id}/status", put(update_application_status))
}

#[derive(Deserialize)]
pub struct JobListQuery {
    pub department: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

async fn list_jobs(
    State(state): State<PortalState>,
    auth: Option<AuthUser>,
    ApiQuery(query): ApiQuery<JobListQuery>,
) -> ApiResult<Json<Vec<CareerJob>>> {
    let include_inactive = query.include_inactive && auth.is_some_and(|a| a.has_role(EDITOR_ROLES));
    let department = validation::optional(query.department);
    let mut conn = state.conn().await?;
    let jobs = career_service::list_jobs(&mut conn, department.as_deref(), include_inactive).await?;
    Ok(Json(jobs))
}

async fn get_job(
    State(state): State<PortalState>,
    auth: Option<AuthUser>,
    ApiPath(job_id): ApiPath<i64>,
) -> ApiResult<Json<CareerJob>> {
    let is_editor = auth.is_some_and(|a| a.has_role(EDITOR_ROLES));
    let mut conn = state.conn().await?;
    career_service::get_job(&mut conn, job_id)
        .await?
        .filter(|job| job.active || is_editor)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("job"))
}

#[derive(Deserialize)]
pub struct JobRequest {
    pub title: String,
    pub department: String,
    pub employment_type: String,
    pub location: Option<String>,
    pub description: String,
    pub requirements: Option<String>,
    pub deadline: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

async fn create_job(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<JobRequest>,
) -> ApiResult<(StatusCode, Json<CareerJob>)> {
    auth.require(EDITOR_ROLES)?;
    let new_job = NewCareerJob {
        title: validation::required("title", &req.title)?,
        department: validation::required("department", &req.department)?,
        employment_type: validation::one_of("employment_type", &req.employment_type, EMPLOYMENT_TYPES)?,
        location: validation::optional(req.location),
        description: validation::required("description", &req.description)?,
        requirements: validation::optional(req.requirements),
        deadline: req.deadline,
        active: req.active,
    };
    let mut conn = state.conn().await?;
    let job = career_service::create_job(&mut conn, new_job).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[derive(Deserialize)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub department: Option<String>,
    pub employment_type: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub active: Option<bool>,
}

async fn update_job(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(job_id): ApiPath<i64>,
    ApiJson(req): ApiJson<JobUpdate>,
) -> ApiResult<Json<CareerJob>> {
    auth.require(EDITOR_ROLES)?;
    let changes = CareerJobChanges {
        title: req.title.as_deref().map(|v| validation::required("title", v)).transpose()?,
        department: req
            .department
            .as_deref()
            .map(|v| validation::required("department", v))
            .transpose()?,
        employment_type: req
            .employment_type
            .as_deref()
            .map(|v| validation::one_of("employment_type", v, EMPLOYMENT_TYPES))
            .transpose()?,
        location: validation::optional(req.location),
        description: req
            .description
            .as_deref()
            .map(|v| validation::required("description", v))
            .transpose()?,
        requirements: validation::optional(req.requirements),
        deadline: req.deadline,
        active: req.active,
        updated_at: None,
    };
    let mut conn = state.conn().await?;
    let job = career_service::update_job(&mut conn, job_id, changes).await?;
    Ok(Json(job))
}

async fn delete_job(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(job_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    auth.require(EDITOR_ROLES)?;
    let mut conn = state.conn().await?;
    let removed = career_service::delete_job(&mut conn, job_id).await?;
    drop(conn);

    for key in removed.iter().flatten() {
        if let Err(e) = state.media.delete(key).await {
            tracing::warn!(key = %key, "Stored résumé not removed: {e}");
        }
    }
    deleted("job", removed.is_some())
}

/// Public application form: `full_name`, `email`, `phone`, optional
/// `cover_letter` and an optional PDF in `resume`.
async fn submit_application(
    State(state): State<PortalState>,
    ApiPath(job_id): ApiPath<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<CareerApplication>)> {
    let mut form = MultipartForm::read(multipart?, "resume").await?;
    let full_name = validation::required("full_name", form.text("full_name"))?;
    let email = validation::email("email", form.text("email"))?;
    let phone = validation::phone("phone", form.text("phone"))?;
    let cover_letter = form.optional("cover_letter");
    let resume = match form.file.take() {
        Some(file) => {
            let key = validate_upload(UploadKind::Resume, &file, state.config.max_upload_bytes)?;
            Some((key, file))
        }
        None => None,
    };

    let mut conn = state.conn().await?;
    let job = career_service::get_job(&mut conn, job_id)
        .await?
        .filter(|job| job.active)
        .ok_or_else(|| ApiError::not_found("job"))?;
    if !job.is_open(chrono::Utc::now().date_naive()) {
        return Err(ApiError::validation("applications for this vacancy are closed"));
    }
    if career_service::has_applied(&mut conn, job_id, &email).await? {
        return Err(ApiError::Conflict(format!("{email} has already applied for this vacancy")));
    }

    let (resume_key, resume_url) = match &resume {
        Some((key, file)) => {
            let url = state.media.put(key, &file.data, &file.content_type).await?;
            crate::metrics::upload_stored(UploadKind::Resume.prefix(), file.data.len());
            (Some(key.clone()), Some(url))
        }
        None => (None, None),
    };

    let created = career_service::create_application(
        &mut conn,
        NewCareerApplication {
            job_id,
            full_name,
            email,
            phone,
            cover_letter,
            resume_key: resume_key.clone(),
            resume_url,
            status: "received".to_string(),
        },
    )
    .await;
    drop(conn);
    let application = match created {
        Ok(application) => application,
        Err(e) => {
            if let Some(key) = resume_key {
                if let Err(err) = state.media.delete(&key).await {
                    tracing::warn!(key = %key, "Failed to remove orphaned résumé: {err}");
                }
            }
            return Err(e.into());
        }
    };

    state
        .send_best_effort(crate::mail::application_received(
            &application.email,
            &application.full_name,
            &job.title,
        ))
        .await;
    state
        .notify_office(
            format!("New application: {}", job.title),
            format!(
                "{} <{}> applied for {} (application #{}).",
                application.full_name, application.email, job.title, application.id
            ),
        )
        .await;
    Ok((StatusCode::CREATED, Json(application)))
}

#[derive(Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
}

async fn list_applications(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(job_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<ApplicationListQuery>,
) -> ApiResult<Json<Vec<CareerApplication>>> {
    auth.require(EDITOR_ROLES)?;
    let status = query
        .status
        .as_deref()
        .map(|s| validation::one_of("status", s, APPLICATION_STATUSES))
        .transpose()?;
    let mut conn = state.conn().await?;
    if career_service::get_job(&mut conn, job_id).await?.is_none() {
        return Err(ApiError::not_found("job"));
    }
    let applications = career_service::list_applications(&mut conn, job_id, status.as_deref()).await?;
    Ok(Json(applications))
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

async fn update_application_status(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(application_id): ApiPath<i64>,
    ApiJson(req): ApiJson<StatusUpdate>,
) -> ApiResult<Json<CareerApplication>> {
    auth.require(EDITOR_ROLES)?;
    let status = validation::one_of("status", &req.status, APPLICATION_STATUSES)?;
    let mut conn = state.conn().await?;
    let application = career_service::update_application_status(&mut conn, application_id, &status).await?;
    Ok(Json(application))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::auth::tests::bearer_for;
    use crate::auth::{ROLE_PARENT, ROLE_STAFF};
    use crate::routes::testing::{app, call, call_multipart, db_app, multipart_body};

    #[tokio::test]
    async fn job_management_needs_an_editor() {
        let app = app();
        let body = json!({
            "title": "Maths Teacher",
            "department": "Mathematics",
            "employment_type": "full_time",
            "description": "Teach maths",
        });
        let (status, _) = call(&app.router, "POST", "/api/careers", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let parent = bearer_for(ROLE_PARENT, Some("ADM/2024/0001"));
        let (status, _) = call(&app.router, "POST", "/api/careers", Some(&parent), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&app.router, "GET", "/api/careers/1/applications", Some(&parent), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn job_fields_are_validated() {
        let app = app();
        let staff = bearer_for(ROLE_STAFF, None);
        let (status, body) = call(
            &app.router,
            "POST",
            "/api/careers",
            Some(&staff),
            Some(json!({
                "title": "Maths Teacher",
                "department": "Mathematics",
                "employment_type": "forever",
                "description": "Teach maths",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "employment_type must be one of: full_time, part_time, contract, internship"
        );

        let (status, _) = call(
            &app.router,
            "PUT",
            "/api/careers/applications/4/status",
            Some(&staff),
            Some(json!({ "status": "promoted" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn application_form_is_validated_before_storage() {
        let app = app();
        let body = multipart_body(
            &[("full_name", "Jane Doe"), ("email", "jane@example.com"), ("phone", "0712 345 678")],
            Some(("resume", "cv.png", "image/png", crate::storage::tests::PNG_BYTES)),
        );
        let (status, body) = call_multipart(&app.router, "/api/careers/1/applications", None, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("unsupported file type image/png"));
        assert!(app.media.objects.lock().unwrap().is_empty());

        let body = multipart_body(&[("full_name", "Jane Doe"), ("email", "jane"), ("phone", "0712 345 678")], None);
        let (status, _) = call_multipart(&app.router, "/api/careers/1/applications", None, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn application_lifecycle() {
        let Some(app) = db_app().await else { return };
        let staff = bearer_for(ROLE_STAFF, None);

        let (status, job) = call(
            &app.router,
            "POST",
            "/api/careers",
            Some(&staff),
            Some(json!({
                "title": "Librarian",
                "department": "Library",
                "employment_type": "part_time",
                "description": "Run the library",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let apply_uri = format!("/api/careers/{}/applications", job["id"]);
        let email = format!("applicant-{}@example.com", uuid::Uuid::new_v4());

        let form = || {
            multipart_body(
                &[("full_name", "Sam Kim"), ("email", email.as_str()), ("phone", "+254 700 000000")],
                Some(("resume", "cv.pdf", "application/pdf", &b"%PDF-1.4\n"[..])),
            )
        };
        let (status, application) = call_multipart(&app.router, &apply_uri, None, form()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(application["status"], "received");
        assert!(application["resume_url"].as_str().unwrap().ends_with(".pdf"));
        assert_eq!(app.media.objects.lock().unwrap().len(), 1);

        let listed = |jobs: &serde_json::Value| jobs.as_array().unwrap().iter().any(|j| j["id"] == job["id"]);
        let (_, jobs) = call(&app.router, "GET", "/api/careers?department=LIBRARY", None, None).await;
        assert!(listed(&jobs));
        let (_, jobs) = call(&app.router, "GET", "/api/careers?department=%25", None, None).await;
        assert!(!listed(&jobs));
        let (_, jobs) = call(&app.router, "GET", "/api/careers?department=L_brary", None, None).await;
        assert!(!listed(&jobs));

        let (status, _) = call_multipart(&app.router, &apply_uri, None, form()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let status_uri = format!("/api/careers/applications/{}/status", application["id"]);
        let (status, _) = call(&app.router, "PUT", &status_uri, Some(&staff), Some(json!({ "status": "hired" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, updated) =
            call(&app.router, "PUT", &status_uri, Some(&staff), Some(json!({ "status": "shortlisted" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "shortlisted");

        let job_uri = format!("/api/careers/{}", job["id"]);
        let (status, _) = call(&app.router, "DELETE", &job_uri, Some(&staff), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(app.media.objects.lock().unwrap().is_empty());
        let (status, _) = call(&app.router, "GET", &job_uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
