//! counseling_events: guidance and counseling calendar.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::counseling_events;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = counseling_events)]
pub struct CounselingEvent {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub counselor: Option<String>,
    pub audience: String,
    pub location: Option<String>,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = counseling_events)]
pub struct NewCounselingEvent {
    pub title: String,
    pub description: String,
    pub counselor: Option<String>,
    #[serde(default = "default_audience")]
    pub audience: String,
    pub location: Option<String>,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

fn default_audience() -> String {
    "all".to_string()
}

#[derive(Debug, Default, AsChangeset, Deserialize)]
#[diesel(table_name = counseling_events)]
pub struct CounselingEventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub counselor: Option<String>,
    pub audience: Option<String>,
    pub location: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}
