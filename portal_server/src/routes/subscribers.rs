//! Newsletter subscription, unsubscribe links and broadcasts.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{deleted, message, ApiJson, ApiPath, ApiQuery, PortalState};
use crate::auth::{AuthUser, ADMIN_ROLES};
use crate::error::{ApiError, ApiResult};
use crate::models::subscriber::Subscriber;
use crate::services::subscriber_service::{self, Subscription};
use crate::validation;

pub fn router() -> Router<PortalState> {
    Router::new()
        .route("/subscribers", get(list_subscribers).post(subscribe))
        .route("/subscribers/unsubscribe", get(unsubscribe))
        .route("/subscribers/broadcast", post(broadcast))
        .route("/subscribers/{id}", delete(delete_subscriber))
}

#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

async fn subscribe(
    State(state): State<PortalState>,
    ApiJson(req): ApiJson<SubscribeRequest>,
) -> ApiResult<(StatusCode, Json<Subscriber>)> {
    let email = validation::email("email", &req.email)?;
    let mut conn = state.conn().await?;
    let outcome = subscriber_service::subscribe(&mut conn, &email).await?;
    drop(conn);

    let (status, subscriber) = match outcome {
        Subscription::Created(s) => (StatusCode::CREATED, s),
        Subscription::Reactivated(s) => (StatusCode::OK, s),
    };
    let link = subscriber_service::unsubscribe_link(
        &state.config.public_base_url,
        &state.config.unsubscribe_secret,
        &subscriber.email,
    );
    state
        .send_best_effort(crate::mail::newsletter_welcome(&subscriber.email, &link))
        .await;
    Ok((status, Json(subscriber)))
}

#[derive(Deserialize)]
pub struct UnsubscribeQuery {
    pub email: String,
    pub token: String,
}

async fn unsubscribe(
    State(state): State<PortalState>,
    ApiQuery(query): ApiQuery<UnsubscribeQuery>,
) -> ApiResult<Json<Value>> {
    let email = validation::email("email", &query.email)?;
    if !subscriber_service::verify_unsubscribe_token(&state.config.unsubscribe_secret, &email, &query.token) {
        return Err(ApiError::Forbidden("invalid unsubscribe link".to_string()));
    }
    let mut conn = state.conn().await?;
    subscriber_service::unsubscribe(&mut conn, &email)
        .await?
        .ok_or_else(|| ApiError::not_found("subscriber"))?;
    tracing::info!("Newsletter subscriber unsubscribed");
    Ok(message("you have been unsubscribed"))
}

#[derive(Deserialize)]
pub struct SubscriberQuery {
    #[serde(default)]
    pub active_only: bool,
}

async fn list_subscribers(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<SubscriberQuery>,
) -> ApiResult<Json<Vec<Subscriber>>> {
    auth.require(ADMIN_ROLES)?;
    let mut conn = state.conn().await?;
    let subscribers = subscriber_service::list_subscribers(&mut conn, query.active_only).await?;
    Ok(Json(subscribers))
}

async fn delete_subscriber(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiPath(subscriber_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    auth.require(ADMIN_ROLES)?;
    let mut conn = state.conn().await?;
    let removed = subscriber_service::delete_subscriber(&mut conn, subscriber_id).await?;
    deleted("subscriber", removed)
}

#[derive(Deserialize)]
pub struct BroadcastRequest {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct BroadcastReport {
    pub recipients: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Mail every active subscriber, one message each with its own unsubscribe link.
async fn broadcast(
    State(state): State<PortalState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<BroadcastRequest>,
) -> ApiResult<Json<BroadcastReport>> {
    auth.require(ADMIN_ROLES)?;
    let subject = validation::required("subject", &req.subject)?;
    let body = validation::required("body", &req.body)?;

    let mut conn = state.conn().await?;
    let recipients = subscriber_service::list_subscribers(&mut conn, true).await?;
    drop(conn);

    let mut report = BroadcastReport {
        recipients: recipients.len(),
        sent: 0,
        failed: 0,
    };
    for subscriber in &recipients {
        let link = subscriber_service::unsubscribe_link(
            &state.config.public_base_url,
            &state.config.unsubscribe_secret,
            &subscriber.email,
        );
        let mail = crate::mail::newsletter_issue(&subscriber.email, &subject, &body, &link);
        match state.mailer.send(mail).await {
            Ok(()) => report.sent += 1,
            Err(e) => {
                report.failed += 1;
                tracing::warn!(subscriber_id = subscriber.id, "Newsletter delivery failed: {e:#}");
            }
        }
    }
    tracing::info!(
        by = auth.id(),
        recipients = report.recipients,
        sent = report.sent,
        failed = report.failed,
        "Newsletter broadcast finished"
    );
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::auth::tests::bearer_for;
    use crate::auth::{ROLE_ADMIN, ROLE_STAFF};
    use crate::routes::testing::{app, call, db_app};
    use crate::services::subscriber_service;

    #[tokio::test]
    async fn bad_unsubscribe_token_is_403() {
        let app = app();
        let (status, body) = call(
            &app.router,
            "GET",
            "/api/subscribers/unsubscribe?email=reader%40example.com&token=deadbeef",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "invalid unsubscribe link");

        let (status, _) = call(&app.router, "GET", "/api/subscribers/unsubscribe?email=reader%40example.com", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn subscribe_validates_email() {
        let app = app();
        let (status, _) = call(&app.router, "POST", "/api/subscribers", None, Some(json!({ "email": "nope" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn broadcast_is_admin_only() {
        let app = app();
        let staff = bearer_for(ROLE_STAFF, None);
        let (status, _) = call(
            &app.router,
            "POST",
            "/api/subscribers/broadcast",
            Some(&staff),
            Some(json!({ "subject": "News", "body": "Hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = bearer_for(ROLE_ADMIN, None);
        let (status, _) = call(
            &app.router,
            "POST",
            "/api/subscribers/broadcast",
            Some(&admin),
            Some(json!({ "subject": " ", "body": "Hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn subscription_lifecycle() {
        let Some(app) = db_app().await else { return };
        let email = format!("reader-{}@example.com", uuid::Uuid::new_v4());

        let (status, _) = call(&app.router, "POST", "/api/subscribers", None, Some(json!({ "email": email }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = call(&app.router, "POST", "/api/subscribers", None, Some(json!({ "email": email }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let welcome = app.mailer.sent.lock().unwrap()[0].clone();
        assert_eq!(welcome.kind, "newsletter_welcome");
        let link = welcome.body.lines().find(|l| l.contains("/unsubscribe?")).unwrap().to_string();
        let path = &link[link.find("/api/").unwrap()..];
        let (status, _) = call(&app.router, "GET", path, None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app.router, "POST", "/api/subscribers", None, Some(json!({ "email": email }))).await;
        assert_eq!(status, StatusCode::OK);

        let token = subscriber_service::unsubscribe_token("unsubscribe-secret", "ghost@example.com");
        let uri = format!("/api/subscribers/unsubscribe?email=ghost%40example.com&token={token}");
        let (status, _) = call(&app.router, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unsubscribe_link_survives_reserved_characters() {
        let Some(app) = db_app().await else { return };
        let email = format!("a&b-{}@example.com", uuid::Uuid::new_v4().simple());
        let (status, _) = call(&app.router, "POST", "/api/subscribers", None, Some(json!({ "email": email }))).await;
        assert_eq!(status, StatusCode::CREATED);

        let welcome = app.mailer.sent.lock().unwrap()[0].clone();
        let link = welcome.body.lines().find(|l| l.contains("/unsubscribe?")).unwrap().to_string();
        assert!(link.contains("email=a%26b-"));
        let path = &link[link.find("/api/").unwrap()..];
        let (status, body) = call(&app.router, "GET", path.trim(), None, None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
}
