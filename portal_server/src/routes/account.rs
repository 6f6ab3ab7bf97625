//! Login, current user and password reset.

use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{message, ApiJson, PortalState};
use crate::auth::{self, AuthUser, IssuedToken};
use crate::error::{ApiError, ApiResult};
use crate::models::user::User;
use crate::services::{password_reset_service, user_service};
use crate::validation;

/// Same answer whether or not the address has an account.
const RESET_REQUESTED: &str = "if that email has an account, a reset link has been sent";

pub fn router() -> Router<PortalState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/password-reset/request", post(request_password_reset))
        .route("/auth/password-reset/confirm", post(confirm_password_reset))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub user: User,
}

fn bad_credentials() -> ApiError {
    ApiError::Unauthorized("invalid email or password".to_string())
}

async fn login(
    State(state): State<PortalState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = validation::email("email", &req.email)?;
    if req.password.is_empty() {
        return Err(ApiError::validation("password is required"));
    }

    let mut conn = state.conn().await?;
    let Some(user) = user_service::find_by_email(&mut conn, &email).await? else {
        crate::metrics::login_attempt("unknown");
        return Err(bad_credentials());
    };
    drop(conn);

    if !super::verify_password(req.password, user.password_hash.clone()).await? {
        crate::metrics::login_attempt("bad_password");
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(bad_credentials());
    }
    if !user.active {
        crate::metrics::login_attempt("inactive");
        return Err(ApiError::Unauthorized("account is deactivated".to_string()));
    }

    let token = auth::issue_token(&state.config, &user)?;
    crate::metrics::login_attempt("success");
    tracing::info!(user_id = user.id, role = %user.role, "User logged in");
    Ok(Json(LoginResponse { token, user }))
}

async fn me(State(state): State<PortalState>, auth: AuthUser) -> ApiResult<Json<User>> {
    let mut conn = state.conn().await?;
    user_service::get_user(&mut conn, auth.id())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("user"))
}

#[derive(Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

async fn request_password_reset(
    State(state): State<PortalState>,
    ApiJson(req): ApiJson<ResetRequest>,
) -> ApiResult<Json<Value>> {
    let email = validation::email("email", &req.email)?;

    let mut conn = state.conn().await?;
    let user = user_service::find_by_email(&mut conn, &email)
        .await?
        .filter(|u| u.active);
    let Some(user) = user else {
        password_reset_service::purge_expired(&mut conn).await?;
        tracing::info!("Password reset requested for an unknown or inactive account");
        return Ok(message(RESET_REQUESTED));
    };

    let ttl = state.config.reset_token_ttl_secs;
    let issued = password_reset_service::create_reset(&mut conn, user.id, ttl).await?;
    drop(conn);

    let link = format!(
        "{}/reset-password?token={}",
        state.config.public_base_url.trim_end_matches('/'),
        issued.token
    );
    state
        .mailer
        .send(crate::mail::password_reset(&user.email, &user.full_name, &link, ttl / 60))
        .await?;
    Ok(message(RESET_REQUESTED))
}

#[derive(Deserialize)]
pub struct ResetConfirm {
    pub token: String,
    pub password: String,
}

async fn confirm_password_reset(
    State(state): State<PortalState>,
    ApiJson(req): ApiJson<ResetConfirm>,
) -> ApiResult<Json<Value>> {
    let token = validation::required("token", &req.token)?;
    validation::password(&req.password)?;
    let password_hash = super::hash_password(req.password).await?;

    let mut conn = state.conn().await?;
    let user = password_reset_service::confirm_reset(&mut conn, &token, password_hash).await?;
    drop(conn);

    state
        .send_best_effort(crate::mail::password_changed(&user.email, &user.full_name))
        .await;
    Ok(message("password has been reset"))
}
