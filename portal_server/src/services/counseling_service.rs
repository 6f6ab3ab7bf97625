//! Guidance and counseling events.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::counseling::{CounselingEvent, CounselingEventChanges, NewCounselingEvent};
use crate::schema::counseling_events;

/// List events ordered by date; `upcoming_only` hides past dates.
pub async fn list_events(
    conn: &mut AsyncPgConnection,
    upcoming_only: bool,
    audience: Option<&str>,
) -> anyhow::Result<Vec<CounselingEvent>> {
    let mut query = counseling_events::table
        .order((counseling_events::event_date.asc(), counseling_events::start_time.asc()))
        .into_boxed();
    if upcoming_only {
        query = query.filter(counseling_events::event_date.ge(chrono::Utc::now().date_naive()));
    }
    if let Some(audience) = audience {
        query = query.filter(counseling_events::audience.eq(audience.to_string()));
    }
    let results = query.load::<CounselingEvent>(conn).await?;
    Ok(results)
}

pub async fn get_event(conn: &mut AsyncPgConnection, event_id: i64) -> anyhow::Result<Option<CounselingEvent>> {
    let result = counseling_events::table
        .find(event_id)
        .first::<CounselingEvent>(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn create_event(
    conn: &mut AsyncPgConnection,
    new_event: NewCounselingEvent,
) -> anyhow::Result<CounselingEvent> {
    let result = diesel::insert_into(counseling_events::table)
        .values(&new_event)
        .get_result::<CounselingEvent>(conn)
        .await?;
    tracing::info!(event_id = result.id, date = %result.event_date, "Counseling event created");
    Ok(result)
}

pub async fn update_event(
    conn: &mut AsyncPgConnection,
    event_id: i64,
    mut changes: CounselingEventChanges,
) -> anyhow::Result<CounselingEvent> {
    changes.updated_at = Some(chrono::Utc::now());
    let result = diesel::update(counseling_events::table.find(event_id))
        .set(&changes)
        .get_result::<CounselingEvent>(conn)
        .await?;
    Ok(result)
}

pub async fn delete_event(conn: &mut AsyncPgConnection, event_id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(counseling_events::table.find(event_id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}
