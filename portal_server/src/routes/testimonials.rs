use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, put};
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use super::{deleted, ApiJson, ApiPath, ApiQuery, PortalState};
use crate::auth::{AuthUser, EDITOR_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::models::testimonial::{NewTestimonial, Testimonial, TestimonialChanges};
use crate::services::testimonial_service;
use crate::validation;

pub fn router() -> Router<PortalState> {
    Router::new()
        .route("/testimonials", get(list_testimonials).post(create_testimonial))
        .route("/testimonials/{id}", put(update_testimonial).delete(delete_testimonial))
}

#[derive(Deserialize)]
pub struct TestimonialQuery {
    #[serde(default)]
    pub all: bool,
}

/// Published testimonials; editors may ask for drafts too with `?all=true`.
async fn list_testimonials(
    State(state): State<PortalState>,
    auth: Option<AuthUser>,
    ApiQuery(query): ApiQuery<TestimonialQuery>,
) -> ApiResult<Json<Vec<Testimonial>>> {
    let published_only = !(query.all && auth.is_some_and(|a| a.has_role(EDITOR_ROLES)));
    let mut conn = state.conn().await?;
    let testimonials = testimonial_service::list_testimonials(&mut conn, published_only).await?;
    Ok(Json(testimonials))
}

async fn create_testimonial(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiJson(mut testimonial): ApiJson<NewTestimonial>,
) -> ApiResult<(StatusCode, Json<Testimonial>)> {
    auth.require(EDITOR_ROLES)?;
    testimonial.author_name = validation::required("author_name", &testimonial.author_name)?;
    testimonial.author_role = validation::required("author_role", &testimonial.author_role)?;
    testimonial.quote = validation::required("quote", &testimonial.quote)?;
    testimonial.photo_url = validation::optional(testimonial.photo_url);

    let mut conn = state.conn().await?;
    let created = testimonial_service::create_testimonial(&mut conn, testimonial).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_testimonial(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(testimonial_id): ApiPath<i64>,
    ApiJson(mut changes): ApiJson<TestimonialChanges>,
) -> ApiResult<Json<Testimonial>> {
    auth.require(EDITOR_ROLES)?;
    if changes.is_empty() {
        return Err(ApiError::validation("nothing to update"));
    }
    if let Some(name) = changes.author_name.take() {
        changes.author_name = Some(validation::required("author_name", &name)?);
    }
    if let Some(role) = changes.author_role.take() {
        changes.author_role = Some(validation::required("author_role", &role)?);
    }
    if let Some(quote) = changes.quote.take() {
        changes.quote = Some(validation::required("quote", &quote)?);
    }

    let mut conn = state.conn().await?;
    let updated = testimonial_service::update_testimonial(&mut conn, testimonial_id, changes).await?;
    Ok(Json(updated))
}

async fn delete_testimonial(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(testimonial_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    auth.require(EDITOR_ROLES)?;
    let mut conn = state.conn().await?;
    let removed = testimonial_service::delete_testimonial(&mut conn, testimonial_id).await?;
    deleted("testimonial", removed)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::auth::tests::bearer_for;
    use crate::auth::{ROLE_PARENT, ROLE_STAFF};
    use crate::routes::testing::{app, call, db_app};

    #[tokio::test]
    async fn editing_requires_editor_role() {
        let app = app();
        let parent = bearer_for(ROLE_PARENT, Some("ADM/2024/0001"));
        let body = json!({ "author_name": "Mrs Njeri", "author_role": "Parent", "quote": "Wonderful teachers." });
        let (status, _) = call(&app.router, "POST", "/api/testimonials", Some(&parent), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let staff = bearer_for(ROLE_STAFF, None);
        let (status, body) = call(&app.router, "PUT", "/api/testimonials/1", Some(&staff), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "nothing to update");

        let (status, _) = call(&app.router, "PUT", "/api/testimonials/1", Some(&staff), Some(json!({ "quote": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn drafts_stay_hidden_from_the_public() {
        let Some(app) = db_app().await else { return };
        let staff = bearer_for(ROLE_STAFF, None);
        let marker = uuid::Uuid::new_v4().to_string();
        let body = json!({ "author_name": "Alumnus", "author_role": "Class of 2010", "quote": marker });
        let (status, draft) = call(&app.router, "POST", "/api/testimonials", Some(&staff), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(draft["published"], false);

        let contains = |list: &serde_json::Value| {
            list.as_array().unwrap().iter().any(|t| t["quote"] == marker.as_str())
        };
        let (_, public) = call(&app.router, "GET", "/api/testimonials?all=true", None, None).await;
        assert!(!contains(&public));
        let (_, everything) = call(&app.router, "GET", "/api/testimonials?all=true", Some(&staff), None).await;
        assert!(contains(&everything));

        let uri = format!("/api/testimonials/{}", draft["id"]);
        let (status, _) = call(&app.router, "PUT", &uri, Some(&staff), Some(json!({ "published": true }))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, public) = call(&app.router, "GET", "/api/testimonials", None, None).await;
        assert!(contains(&public));

        let (status, _) = call(&app.router, "DELETE", &uri, Some(&staff), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app.router, "DELETE", &uri, Some(&staff), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
