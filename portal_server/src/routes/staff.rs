//! Public staff directory and its maintenance.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use super::{deleted, ApiJson, ApiPath, ApiQuery, PortalState};
use crate::auth::{AuthUser, EDITOR_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::models::staff::{NewStaffMember, StaffMember, StaffMemberChanges};
use crate::services::staff_service;
use crate::validation;

pub fn router() -> Router<PortalState> {
    Router::new()
        .route("/staff", get(list_staff).post(create_staff_member))
        .route(
            "/staff/{id}",
            get(get_staff_member).put(update_staff_member).delete(delete_staff_member),
        )
}

#[derive(Deserialize)]
pub struct StaffQuery {
    pub department: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

async fn list_staff(
    State(state): State<PortalState>,
    auth: Option<AuthUser>,
    ApiQuery(query): ApiQuery<StaffQuery>,
) -> ApiResult<Json<Vec<StaffMember>>> {
    let include_inactive = query.include_inactive && auth.is_some_and(|a| a.has_role(EDITOR_ROLES));
    let department = validation::optional(query.department);
    let mut conn = state.conn().await?;
    let staff = staff_service::list_staff(&mut conn, department.as_deref(), include_inactive).await?;
    Ok(Json(staff))
}

async fn get_staff_member(
    State(state): State<PortalState>,
    auth: Option<AuthUser>,
    ApiPath(staff_id): ApiPath<i64>,
) -> ApiResult<Json<StaffMember>> {
    let is_editor = auth.is_some_and(|a| a.has_role(EDITOR_ROLES));
    let mut conn = state.conn().await?;
    staff_service::get_staff_member(&mut conn, staff_id)
        .await?
        .filter(|member| member.active || is_editor)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("staff member"))
}

async fn create_staff_member(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiJson(mut member): ApiJson<NewStaffMember>,
) -> ApiResult<(StatusCode, Json<StaffMember>)> {
    auth.require(EDITOR_ROLES)?;
    member.full_name = validation::required("full_name", &member.full_name)?;
    member.title = validation::required("title", &member.title)?;
    member.department = validation::required("department", &member.department)?;
    member.bio = validation::optional(member.bio);
    member.photo_url = validation::optional(member.photo_url);
    member.email = validation::optional(member.email)
        .map(|email| validation::email("email", &email))
        .transpose()?;

    let mut conn = state.conn().await?;
    let created = staff_service::create_staff_member(&mut conn, member).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_staff_member(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(staff_id): ApiPath<i64>,
    ApiJson(mut changes): ApiJson<StaffMemberChanges>,
) -> ApiResult<Json<StaffMember>> {
    auth.require(EDITOR_ROLES)?;
    if let Some(name) = changes.full_name.take() {
        changes.full_name = Some(validation::required("full_name", &name)?);
    }
    if let Some(title) = changes.title.take() {
        changes.title = Some(validation::required("title", &title)?);
    }
    if let Some(department) = changes.department.take() {
        changes.department = Some(validation::required("department", &department)?);
    }
    if let Some(email) = changes.email.take() {
        changes.email = Some(validation::email("email", &email)?);
    }

    let mut conn = state.conn().await?;
    let updated = staff_service::update_staff_member(&mut conn, staff_id, changes).await?;
    Ok(Json(updated))
}

async fn delete_staff_member(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(staff_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    auth.require(EDITOR_ROLES)?;
    let mut conn = state.conn().await?;
    let removed = staff_service::delete_staff_member(&mut conn, staff_id).await?;
    deleted("staff member", removed)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::auth::tests::bearer_for;
    use crate::auth::{ROLE_STAFF, ROLE_STUDENT};
    use crate::routes::testing::{app, call, db_app};

    #[tokio::test]
    async fn staff_entries_are_validated() {
        let app = app();
        let staff = bearer_for(ROLE_STAFF, None);
        let body = json!({ "full_name": "Mr Kamau", "title": "Head of Science", "department": "Science", "email": "kamau" });
        let (status, res) = call(&app.router, "POST", "/api/staff", Some(&staff), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res["error"], "email is not a valid email address");

        let student = bearer_for(ROLE_STUDENT, Some("ADM/2024/0001"));
        let (status, _) = call(&app.router, "DELETE", "/api/staff/1", Some(&student), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&app.router, "GET", "/api/staff/abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn inactive_members_leave_the_public_directory() {
        let Some(app) = db_app().await else { return };
        let staff = bearer_for(ROLE_STAFF, None);
        let department = format!("dept-{}", uuid::Uuid::new_v4().simple());
        let body = json!({ "full_name": "Ms Wanjiru", "title": "Librarian", "department": department });
        let (status, member) = call(&app.router, "POST", "/api/staff", Some(&staff), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(member["active"], true);

        let list_uri = format!("/api/staff?department={}", department.to_uppercase());
        let (_, listed) = call(&app.router, "GET", &list_uri, None, None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        let wildcard_uri = format!("/api/staff?department={}%25", &department[..8]);
        let (_, listed) = call(&app.router, "GET", &wildcard_uri, None, None).await;
        assert!(listed.as_array().unwrap().iter().all(|m| m["id"] != member["id"]));

        let uri = format!("/api/staff/{}", member["id"]);
        let (status, _) = call(&app.router, "PUT", &uri, Some(&staff), Some(json!({ "active": false }))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, listed) = call(&app.router, "GET", &list_uri, None, None).await;
        assert!(listed.as_array().unwrap().is_empty());
        let (status, _) = call(&app.router, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app.router, "GET", &uri, Some(&staff), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
