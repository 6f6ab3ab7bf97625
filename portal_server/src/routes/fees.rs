//! Fee records and balance statements.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;

use super::{ApiJson, ApiPath, PortalState};
use crate::auth::{AuthUser, ADMIN_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::models::fee::{FeeRecord, FeeRecordChanges, NewFeeRecord};
use crate::services::fee_service::{self, FeeStatement};
use crate::validation;

pub fn router() -> Router<PortalState> {
    Router::new()
        .route("/fees", post(create_record))
        .route("/fees/{key}", get(fee_statement).put(update_record))
}

/// Statement for one student. The admission number is percent-encoded.
async fn fee_statement(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(admission_number): ApiPath<String>,
) -> ApiResult<Json<FeeStatement>> {
    let admission_number = validation::required("admission_number", &admission_number)?;
    auth.require_student_access(&admission_number)?;
    let mut conn = state.conn().await?;
    fee_service::fee_statement(&mut conn, &admission_number)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("fee records"))
}

async fn create_record(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiJson(record): ApiJson<NewFeeRecord>,
) -> ApiResult<(StatusCode, Json<FeeRecord>)> {
    auth.require(ADMIN_ROLES)?;
    let record = NewFeeRecord {
        admission_number: validation::required("admission_number", &record.admission_number)?,
        term: validation::term(&record.term)?,
        year: validation::school_year(record.year)?,
        amount_due: validation::non_negative("amount_due", record.amount_due)?,
        amount_paid: validation::non_negative("amount_paid", record.amount_paid)?,
    };
    let mut conn = state.conn().await?;
    let created = fee_service::create_record(&mut conn, record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_record(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(key): ApiPath<String>,
    ApiJson(changes): ApiJson<FeeRecordChanges>,
) -> ApiResult<Json<FeeRecord>> {
    auth.require(ADMIN_ROLES)?;
    let record_id: i64 = key
        .parse()
        .map_err(|_| ApiError::validation("fee record id must be an integer"))?;
    if changes.amount_due.is_none() && changes.amount_paid.is_none() {
        return Err(ApiError::validation("nothing to update"));
    }
    if let Some(due) = changes.amount_due {
        validation::non_negative("amount_due", due)?;
    }
    if let Some(paid) = changes.amount_paid {
        validation::non_negative("amount_paid", paid)?;
    }

    let mut conn = state.conn().await?;
    let updated = fee_service::update_record(&mut conn, record_id, changes).await?;
    tracing::info!(fee_record_id = record_id, by = auth.id(), "Fee record updated");
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::auth::tests::bearer_for;
    use crate::auth::{ROLE_ADMIN, ROLE_PARENT, ROLE_STAFF};
    use crate::routes::testing::{app, call, db_app};

    #[tokio::test]
    async fn amounts_must_not_be_negative() {
        let app = app();
        let admin = bearer_for(ROLE_ADMIN, None);
        let (status, body) = call(
            &app.router,
            "POST",
            "/api/fees",
            Some(&admin),
            Some(json!({ "admission_number": "ADM/2024/0001", "term": "term_1", "year": 2025, "amount_due": -5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "amount_due must not be negative");

        let (status, _) = call(&app.router, "PUT", "/api/fees/3", Some(&admin), Some(json!({ "amount_paid": -1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app.router, "PUT", "/api/fees/3", Some(&admin), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn fee_access_rules() {
        let app = app();
        let staff = bearer_for(ROLE_STAFF, None);
        let (status, _) = call(
            &app.router,
            "POST",
            "/api/fees",
            Some(&staff),
            Some(json!({ "admission_number": "ADM/2024/0001", "term": "term_1", "year": 2025, "amount_due": 100 })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let parent = bearer_for(ROLE_PARENT, Some("ADM/2024/0001"));
        let (status, _) = call(&app.router, "GET", "/api/fees/ADM%2F2024%2F0009", Some(&parent), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn statement_reflects_payments() {
        let Some(app) = db_app().await else { return };
        let admin = bearer_for(ROLE_ADMIN, None);
        let adm = format!("ADM/2025/{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
        let uri = format!("/api/fees/{}", adm.replace('/', "%2F"));

        let (status, _) = call(&app.router, "GET", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let record = json!({ "admission_number": adm, "term": "term_1", "year": 2025, "amount_due": 30000 });
        let (status, created) = call(&app.router, "POST", "/api/fees", Some(&admin), Some(record.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = call(&app.router, "POST", "/api/fees", Some(&admin), Some(record)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let parent = bearer_for(ROLE_PARENT, Some(&adm));
        let (status, statement) = call(&app.router, "GET", &uri, Some(&parent), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(statement["status"], "pending");
        assert_eq!(statement["balance"], 30000);

        let update_uri = format!("/api/fees/{}", created["id"]);
        let (status, _) = call(&app.router, "PUT", &update_uri, Some(&admin), Some(json!({ "amount_paid": 12000 }))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, statement) = call(&app.router, "GET", &uri, Some(&parent), None).await;
        assert_eq!(statement["status"], "partial");
        assert_eq!(statement["records"][0]["balance"], 18000);

        call(&app.router, "PUT", &update_uri, Some(&admin), Some(json!({ "amount_paid": 30000 }))).await;
        let (_, statement) = call(&app.router, "GET", &uri, Some(&parent), None).await;
        assert_eq!(statement["status"], "completed");
    }
}
