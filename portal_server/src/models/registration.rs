//! registrations: admission applications submitted from the public site.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::registrations;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = registrations)]
pub struct Registration {
    pub id: i64,
    pub student_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub grade_applying: String,
    pub previous_school: Option<String>,
    pub parent_name: String,
    pub parent_email: String,
    pub parent_phone: String,
    pub notes: Option<String>,
    pub status: String,
    pub admission_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = registrations)]
pub struct NewRegistration {
    pub student_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub grade_applying: String,
    pub previous_school: Option<String>,
    pub parent_name: String,
    pub parent_email: String,
    pub parent_phone: String,
    pub notes: Option<String>,
    pub status: String,
}
