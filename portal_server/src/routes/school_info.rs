use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;

use super::{ApiJson, PortalState};
use crate::auth::{AuthUser, ADMIN_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::models::school_info::{SchoolInfo, SchoolInfoForm};
use crate::services::school_info_service;
use crate::validation;

pub fn router() -> Router<PortalState> {
    Router::new().route("/school-info", get(get_info).put(update_info))
}

async fn get_info(State(state): State<PortalState>) -> ApiResult<Json<SchoolInfo>> {
    let mut conn = state.conn().await?;
    school_info_service::get_info(&mut conn)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("school info"))
}

async fn update_info(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiJson(form): ApiJson<SchoolInfoForm>,
) -> ApiResult<Json<SchoolInfo>> {
    auth.require(ADMIN_ROLES)?;
    let form = SchoolInfoForm {
        name: validation::required("name", &form.name)?,
        motto: validation::optional(form.motto),
        email: validation::email("email", &form.email)?,
        phone: validation::phone("phone", &form.phone)?,
        address: validation::required("address", &form.address)?,
        about: validation::optional(form.about),
        mission: validation::optional(form.mission),
        vision: validation::optional(form.vision),
    };
    let mut conn = state.conn().await?;
    let info = school_info_service::upsert_info(&mut conn, form).await?;
    Ok(Json(info))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::auth::tests::bearer_for;
    use crate::auth::{ROLE_ADMIN, ROLE_STAFF};
    use crate::routes::testing::{app, call, db_app};

    fn form() -> serde_json::Value {
        json!({
            "name": "Hillcrest School",
            "motto": "Strive for excellence",
            "email": "Office@Hillcrest.test",
            "phone": "+254 20 1234567",
            "address": "1 School Lane, Nairobi",
        })
    }

    #[tokio::test]
    async fn only_admins_edit_school_info() {
        let app = app();
        let staff = bearer_for(ROLE_STAFF, None);
        let (status, _) = call(&app.router, "PUT", "/api/school-info", Some(&staff), Some(form())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = bearer_for(ROLE_ADMIN, None);
        let mut bad = form();
        bad["phone"] = json!("n/a");
        let (status, _) = call(&app.router, "PUT", "/api/school-info", Some(&admin), Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upsert_then_read() {
        let Some(app) = db_app().await else { return };
        let admin = bearer_for(ROLE_ADMIN, None);
        let (status, saved) = call(&app.router, "PUT", "/api/school-info", Some(&admin), Some(form())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["id"], 1);
        assert_eq!(saved["email"], "office@hillcrest.test");

        let (status, info) = call(&app.router, "GET", "/api/school-info", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(info["name"], "Hillcrest School");
    }
}
