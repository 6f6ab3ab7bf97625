//! career_jobs + career_applications: vacancies and the applications against them.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::{career_applications, career_jobs};

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = career_jobs)]
pub struct CareerJob {
    pub id: i64,
    pub title: String,
    pub department: String,
    pub employment_type: String,
    pub location: Option<String>,
    pub description: String,
    pub requirements: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CareerJob {
    /// Whether the vacancy still takes applications on `today`.
    pub fn is_open(&self, today: NaiveDate) -> bool {
        self.active && self.deadline.map_or(true, |d| d >= today)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = career_jobs)]
pub struct NewCareerJob {
    pub title: String,
    pub department: String,
    pub employment_type: String,
    pub location: Option<String>,
    pub description: String,
    pub requirements: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub active: bool,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = career_jobs)]
pub struct CareerJobChanges {
    pub title: Option<String>,
    pub department: Option<String>,
    pub employment_type: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = career_applications)]
pub struct CareerApplication {
    pub id: i64,
    pub job_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: Option<String>,
    #[serde(skip_serializing)]
    pub resume_key: Option<String>,
    pub resume_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = career_applications)]
pub struct NewCareerApplication {
    pub job_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: Option<String>,
    pub resume_key: Option<String>,
    pub resume_url: Option<String>,
    pub status: String,
}
