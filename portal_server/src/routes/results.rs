//! Student exam results.
//!
//! Admission numbers contain slashes (`ADM/2025/0042`); clients send them
//! percent-encoded in the path (`ADM%2F2025%2F0042`).

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use super::{deleted, ApiJson, ApiPath, PortalState};
use crate::auth::{AuthUser, EDITOR_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::models::student_result::{NewStudentResult, StudentResult};
use crate::services::result_service;
use crate::validation;

pub fn router() -> Router<PortalState> {
    Router::new()
        .route("/results", post(create_result))
        .route("/results/{key}", get(list_results).delete(delete_result))
}

async fn list_results(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(admission_number): ApiPath<String>,
) -> ApiResult<Json<Vec<StudentResult>>> {
    let admission_number = validation::required("admission_number", &admission_number)?;
    auth.require_student_access(&admission_number)?;
    let mut conn = state.conn().await?;
    let results = result_service::list_for_student(&mut conn, &admission_number).await?;
    Ok(Json(results))
}

#[derive(Deserialize)]
pub struct ResultRequest {
    pub admission_number: String,
    pub student_name: String,
    pub class_name: String,
    pub term: String,
    pub year: i32,
    pub scores: BTreeMap<String, i32>,
    pub remarks: Option<String>,
}

impl ResultRequest {
    fn validate(self) -> ApiResult<NewStudentResult> {
        let mut scores = BTreeMap::new();
        for (subject, score) in self.scores {
            let subject = subject.trim().to_string();
            if scores.contains_key(&subject) {
                return Err(ApiError::validation(format!("duplicate subject {subject}")));
            }
            scores.insert(subject, score);
        }
        let summary = result_service::summarize_scores(&scores)?;
        Ok(NewStudentResult {
            admission_number: validation::required("admission_number", &self.admission_number)?,
            student_name: validation::required("student_name", &self.student_name)?,
            class_name: validation::required("class_name", &self.class_name)?,
            term: validation::term(&self.term)?,
            year: validation::school_year(self.year)?,
            scores: serde_json::to_value(&scores).map_err(|e| ApiError::Internal(e.into()))?,
            total: summary.total,
            mean: summary.mean,
            grade: summary.grade.to_string(),
            remarks: validation::optional(self.remarks),
        })
    }
}

async fn create_result(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<ResultRequest>,
) -> ApiResult<(StatusCode, Json<StudentResult>)> {
    auth.require(EDITOR_ROLES)?;
    let new_result = req.validate()?;
    let mut conn = state.conn().await?;
    let result = result_service::create_result(&mut conn, new_result).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// `DELETE /results/{id}`; the segment is shared with the per-student listing.
async fn delete_result(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(key): ApiPath<String>,
) -> ApiResult<Json<Value>> {
    auth.require(EDITOR_ROLES)?;
    let result_id: i64 = key
        .parse()
        .map_err(|_| ApiError::validation("result id must be an integer"))?;
    let mut conn = state.conn().await?;
    let removed = result_service::delete_result(&mut conn, result_id).await?;
    deleted("result", removed)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::auth::tests::bearer_for;
    use crate::auth::{ROLE_PARENT, ROLE_STAFF, ROLE_STUDENT};
    use crate::routes::testing::{app, call, db_app};

    fn result_body(admission_number: &str) -> Value {
        json!({
            "admission_number": admission_number,
            "student_name": "Amina Hassan",
            "class_name": "Form 2 East",
            "term": "term_1",
            "year": 2025,
            "scores": { "Mathematics": 84, "English": 71, "Biology": 66 },
        })
    }

    #[tokio::test]
    async fn portal_users_only_read_their_own_results() {
        let app = app();
        let student = bearer_for(ROLE_STUDENT, Some("ADM/2024/0001"));
        let (status, body) = call(&app.router, "GET", "/api/results/ADM%2F2024%2F0002", Some(&student), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "you may only view your own records");

        let (status, _) = call(&app.router, "GET", "/api/results/ADM%2F2024%2F0001", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn scores_are_validated() {
        let app = app();
        let staff = bearer_for(ROLE_STAFF, None);

        let mut body = result_body("ADM/2024/0001");
        body["scores"]["Mathematics"] = json!(120);
        let (status, res) = call(&app.router, "POST", "/api/results", Some(&staff), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res["error"], "score for Mathematics must be between 0 and 100");

        let mut body = result_body("ADM/2024/0001");
        body["scores"] = json!({});
        let (status, _) = call(&app.router, "POST", "/api/results", Some(&staff), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut body = result_body("ADM/2024/0001");
        body["scores"] = json!({ "Maths": 40, " Maths ": 90 });
        let (status, res) = call(&app.router, "POST", "/api/results", Some(&staff), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res["error"], "duplicate subject Maths");

        let mut body = result_body("ADM/2024/0001");
        body["term"] = json!("summer");
        let (status, _) = call(&app.router, "POST", "/api/results", Some(&staff), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let parent = bearer_for(ROLE_PARENT, Some("ADM/2024/0001"));
        let (status, _) = call(&app.router, "POST", "/api/results", Some(&parent), Some(result_body("ADM/2024/0001"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn delete_needs_a_numeric_id() {
        let app = app();
        let staff = bearer_for(ROLE_STAFF, None);
        let (status, _) = call(&app.router, "DELETE", "/api/results/abc", Some(&staff), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn grades_are_computed_on_create() {
        let Some(app) = db_app().await else { return };
        let staff = bearer_for(ROLE_STAFF, None);
        let adm = format!("ADM/2025/{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);

        let (status, created) = call(&app.router, "POST", "/api/results", Some(&staff), Some(result_body(&adm))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["total"], 221);
        assert_eq!(created["mean"], 73.67);
        assert_eq!(created["grade"], "B+");

        let (status, _) = call(&app.router, "POST", "/api/results", Some(&staff), Some(result_body(&adm))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let student = bearer_for(ROLE_STUDENT, Some(&adm));
        let uri = format!("/api/results/{}", adm.replace('/', "%2F"));
        let (status, list) = call(&app.router, "GET", &uri, Some(&student), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let delete_uri = format!("/api/results/{}", created["id"]);
        let (status, _) = call(&app.router, "DELETE", &delete_uri, Some(&staff), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, list) = call(&app.router, "GET", &uri, Some(&student), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(list.as_array().unwrap().is_empty());
    }
}
