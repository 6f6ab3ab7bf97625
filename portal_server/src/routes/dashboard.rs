use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;

use super::PortalState;
use crate::auth::{AuthUser, ADMIN_ROLES};
use crate::dashboard::stats::{self, DashboardStats};
use crate::error::ApiResult;

pub fn router() -> Router<PortalState> {
    Router::new().route("/dashboard/stats", get(dashboard_stats))
}

async fn dashboard_stats(State(state): State<PortalState>, auth: AuthUser) -> ApiResult<Json<DashboardStats>> {
    auth.require(ADMIN_ROLES)?;
    let mut conn = state.conn().await?;
    let overview = stats::overview(&mut conn).await?;
    Ok(Json(overview))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::auth::tests::bearer_for;
    use crate::auth::{ROLE_ADMIN, ROLE_STAFF};
    use crate::routes::testing::{app, call, db_app};

    #[tokio::test]
    async fn stats_are_admin_only() {
        let app = app();
        let staff = bearer_for(ROLE_STAFF, None);
        let (status, _) = call(&app.router, "GET", "/api/dashboard/stats", Some(&staff), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&app.router, "GET", "/api/dashboard/stats", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn stats_have_every_section() {
        let Some(app) = db_app().await else { return };
        let admin = bearer_for(ROLE_ADMIN, None);
        let (status, stats) = call(&app.router, "GET", "/api/dashboard/stats", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        for section in ["registrations", "careers", "content", "fees"] {
            assert!(stats[section].is_object(), "missing {section}");
        }
        assert!(stats["registrations"]["total"].as_i64().unwrap() >= 0);
    }
}
