//! User administration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use super::{deleted, ApiJson, ApiPath, ApiQuery, PortalState};
use crate::auth::{AuthUser, ADMIN_ROLES, ALL_ROLES, PORTAL_ROLES, ROLE_SUPER_ADMIN};
use crate::error::{ApiError, ApiResult};
use crate::models::user::{NewUser, User, UserChanges};
use crate::services::user_service;
use crate::validation;

pub fn router() -> Router<PortalState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
}

#[derive(Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub admission_number: Option<String>,
}

async fn list_users(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> ApiResult<Json<Vec<User>>> {
    auth.require(ADMIN_ROLES)?;
    let mut conn = state.conn().await?;
    let users = match query.admission_number.as_deref() {
        Some(adm) => user_service::list_by_admission_number(&mut conn, adm).await?,
        None => user_service::list_users(&mut conn, query.role.as_deref()).await?,
    };
    Ok(Json(users))
}

async fn get_user(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<User>> {
    auth.require(ADMIN_ROLES)?;
    let mut conn = state.conn().await?;
    user_service::get_user(&mut conn, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("user"))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub admission_number: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Only a super admin may hand out the super admin role.
fn check_role_grant(auth: &AuthUser, role: &str) -> ApiResult<()> {
    if role == ROLE_SUPER_ADMIN && auth.role() != ROLE_SUPER_ADMIN {
        return Err(ApiError::Forbidden(
            "only a super admin can grant the super_admin role".to_string(),
        ));
    }
    Ok(())
}

/// Super admin accounts are only managed by other super admins.
fn check_target(auth: &AuthUser, target: &User) -> ApiResult<()> {
    if target.role == ROLE_SUPER_ADMIN && auth.role() != ROLE_SUPER_ADMIN {
        return Err(ApiError::Forbidden(
            "only a super admin can modify a super admin account".to_string(),
        ));
    }
    Ok(())
}

/// Student and parent accounts must carry an admission number.
fn check_admission_number(role: &str, admission_number: Option<&str>) -> ApiResult<()> {
    if PORTAL_ROLES.contains(&role) && admission_number.is_none() {
        return Err(ApiError::validation(format!(
            "admission_number is required for {role} accounts"
        )));
    }
    Ok(())
}

async fn create_user(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    auth.require(ADMIN_ROLES)?;
    let full_name = validation::required("full_name", &req.full_name)?;
    let email = validation::email("email", &req.email)?;
    validation::password(&req.password)?;
    let role = validation::one_of("role", &req.role, ALL_ROLES)?;
    check_role_grant(&auth, &role)?;
    let admission_number = validation::optional(req.admission_number);
    check_admission_number(&role, admission_number.as_deref())?;

    let password_hash = super::hash_password(req.password).await?;
    let mut conn = state.conn().await?;
    let user = user_service::create_user(
        &mut conn,
        NewUser {
            full_name,
            email,
            password_hash,
            role,
            admission_number,
            active: req.active,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub admission_number: Option<String>,
    pub active: Option<bool>,
}

async fn update_user(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    auth.require(ADMIN_ROLES)?;
    let mut changes = UserChanges {
        full_name: req
            .full_name
            .as_deref()
            .map(|v| validation::required("full_name", v))
            .transpose()?,
        email: req
            .email
            .as_deref()
            .map(|v| validation::email("email", v))
            .transpose()?,
        role: req
            .role
            .as_deref()
            .map(|v| validation::one_of("role", v, ALL_ROLES))
            .transpose()?,
        admission_number: validation::optional(req.admission_number),
        active: req.active,
        ..Default::default()
    };
    if let Some(role) = changes.role.as_deref() {
        check_role_grant(&auth, role)?;
    }
    if user_id == auth.id() && req.active == Some(false) {
        return Err(ApiError::validation("you cannot deactivate your own account"));
    }
    if let Some(password) = req.password {
        validation::password(&password)?;
        changes.password_hash = Some(super::hash_password(password).await?);
    }

    let mut conn = state.conn().await?;
    let current = user_service::get_user(&mut conn, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("user"))?;
    check_target(&auth, &current)?;
    let role = changes.role.as_deref().unwrap_or(&current.role);
    let admission_number = changes
        .admission_number
        .as_deref()
        .or(current.admission_number.as_deref());
    check_admission_number(role, admission_number)?;

    let user = user_service::update_user(&mut conn, user_id, changes).await?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    auth.require(ADMIN_ROLES)?;
    if user_id == auth.id() {
        return Err(ApiError::validation("you cannot delete your own account"));
    }
    let mut conn = state.conn().await?;
    let target = user_service::get_user(&mut conn, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("user"))?;
    check_target(&auth, &target)?;
    let removed = user_service::delete_user(&mut conn, user_id).await?;
    if removed {
        tracing::info!(user_id, by = auth.id(), "User deleted");
    }
    deleted("user", removed)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::auth::tests::bearer_for;
    use crate::auth::{ROLE_ADMIN, ROLE_STAFF, ROLE_STUDENT, ROLE_SUPER_ADMIN};
    use crate::routes::testing::{app, call, db_app};

    #[tokio::test]
    async fn user_admin_is_role_gated() {
        let app = app();
        let (status, _) = call(&app.router, "GET", "/api/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let staff = bearer_for(ROLE_STAFF, None);
        let (status, body) = call(&app.router, "GET", "/api/users", Some(&staff), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].is_string());

        let student = bearer_for(ROLE_STUDENT, Some("ADM/2024/0001"));
        let (status, _) = call(&app.router, "DELETE", "/api/users/3", Some(&student), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn create_user_validation() {
        let app = app();
        let admin = bearer_for(ROLE_ADMIN, None);

        let (status, body) = call(
            &app.router,
            "POST",
            "/api/users",
            Some(&admin),
            Some(json!({ "full_name": " ", "email": "a@b.co", "password": "long-enough", "role": "staff" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "full_name is required");

        let (status, body) = call(
            &app.router,
            "POST",
            "/api/users",
            Some(&admin),
            Some(json!({ "full_name": "Kid", "email": "k@b.co", "password": "long-enough", "role": "student" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "admission_number is required for student accounts");

        let (status, _) = call(
            &app.router,
            "POST",
            "/api/users",
            Some(&admin),
            Some(json!({ "full_name": "Boss", "email": "b@b.co", "password": "long-enough", "role": "super_admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admins_cannot_delete_themselves() {
        let app = app();
        let admin = bearer_for(ROLE_ADMIN, None);
        // sample users carry id 7
        let (status, _) = call(&app.router, "DELETE", "/api/users/7", Some(&admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn created_user_round_trip() {
        let Some(app) = db_app().await else { return };
        let admin = bearer_for(ROLE_ADMIN, None);
        let email = format!("user-{}@school.test", uuid::Uuid::new_v4());

        let (status, created) = call(
            &app.router,
            "POST",
            "/api/users",
            Some(&admin),
            Some(json!({ "full_name": "Jane Doe", "email": email, "password": "long-enough", "role": "staff" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created.get("password_hash").is_none());
        let uri = format!("/api/users/{}", created["id"]);

        let (status, fetched) = call(&app.router, "GET", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["email"], email);

        let (status, _) = call(
            &app.router,
            "POST",
            "/api/users",
            Some(&admin),
            Some(json!({ "full_name": "Jane Again", "email": email, "password": "long-enough", "role": "staff" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(&app.router, "DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app.router, "GET", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admins_cannot_touch_super_admin_accounts() {
        let Some(app) = db_app().await else { return };
        let root = bearer_for(ROLE_SUPER_ADMIN, None);
        let admin = bearer_for(ROLE_ADMIN, None);
        let email = format!("root-{}@school.test", uuid::Uuid::new_v4());

        let (status, created) = call(
            &app.router,
            "POST",
            "/api/users",
            Some(&root),
            Some(json!({ "full_name": "Second Root", "email": email, "password": "long-enough", "role": "super_admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/users/{}", created["id"]);

        let (status, body) = call(&app.router, "PUT", &uri, Some(&admin), Some(json!({ "password": "taken-over-pass" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "only a super admin can modify a super admin account");
        let (status, _) = call(&app.router, "PUT", &uri, Some(&admin), Some(json!({ "role": "staff" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&app.router, "DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            &app.router,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": "taken-over-pass" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app.router, "PUT", &uri, Some(&root), Some(json!({ "full_name": "Renamed Root" }))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app.router, "DELETE", &uri, Some(&root), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
