//! Student/parent portal summary.

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use super::PortalState;
use crate::auth::{AuthUser, PORTAL_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::models::student_result::StudentResult;
use crate::models::user::User;
use crate::services::fee_service::{self, FeeStatement};
use crate::services::{result_service, user_service};

pub fn router() -> Router<PortalState> {
    Router::new().route("/portal/me", get(my_portal))
}

#[derive(Debug, Serialize)]
pub struct PortalSummary {
    pub user: User,
    pub admission_number: String,
    pub results: Vec<StudentResult>,
    pub fees: Option<FeeStatement>,
}

/// Everything a student or parent sees on login, keyed by the admission
/// number carried in their token.
async fn my_portal(State(state): State<PortalState>, auth: AuthUser) -> ApiResult<Json<PortalSummary>> {
    auth.require(PORTAL_ROLES)?;
    let admission_number = auth
        .0
        .admission_number
        .clone()
        .ok_or_else(|| ApiError::Forbidden("account is not linked to a student".to_string()))?;

    let mut conn = state.conn().await?;
    let user = user_service::get_user(&mut conn, auth.id())
        .await?
        .ok_or_else(|| ApiError::not_found("user"))?;
    let results = result_service::list_for_student(&mut conn, &admission_number).await?;
    let fees = fee_service::fee_statement(&mut conn, &admission_number).await?;
    Ok(Json(PortalSummary {
        user,
        admission_number,
        results,
        fees,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::auth::tests::bearer_for;
    use crate::auth::{ROLE_ADMIN, ROLE_PARENT, ROLE_STUDENT};
    use crate::routes::testing::{app, call, db_app, login_as};

    #[tokio::test]
    async fn portal_is_for_students_and_parents() {
        let app = app();
        let admin = bearer_for(ROLE_ADMIN, None);
        let (status, _) = call(&app.router, "GET", "/api/portal/me", Some(&admin), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let unlinked = bearer_for(ROLE_STUDENT, None);
        let (status, body) = call(&app.router, "GET", "/api/portal/me", Some(&unlinked), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "account is not linked to a student");
    }

    #[tokio::test]
    async fn summary_collects_results_and_fees() {
        let Some(app) = db_app().await else { return };
        let admin = bearer_for(ROLE_ADMIN, None);
        let adm = format!("ADM/2025/{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
        let parent = login_as(&app.router, ROLE_PARENT, Some(&adm)).await;

        let (status, summary) = call(&app.router, "GET", "/api/portal/me", Some(&parent), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["admission_number"], adm.as_str());
        assert!(summary["results"].as_array().unwrap().is_empty());
        assert!(summary["fees"].is_null());

        let fee = json!({ "admission_number": adm, "term": "term_2", "year": 2025, "amount_due": 500, "amount_paid": 600 });
        let (status, _) = call(&app.router, "POST", "/api/fees", Some(&admin), Some(fee)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, summary) = call(&app.router, "GET", "/api/portal/me", Some(&parent), None).await;
        assert_eq!(summary["fees"]["status"], "overpaid");
        assert_eq!(summary["fees"]["balance"], -100);
        assert!(summary["user"].get("password_hash").is_none());
    }
}
