//! student_results: termly exam results with computed grade.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::student_results;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = student_results)]
pub struct StudentResult {
    pub id: i64,
    pub admission_number: String,
    pub student_name: String,
    pub class_name: String,
    pub term: String,
    pub year: i32,
    pub scores: serde_json::Value,
    pub total: i32,
    pub mean: f64,
    pub grade: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = student_results)]
pub struct NewStudentResult {
    pub admission_number: String,
    pub student_name: String,
    pub class_name: String,
    pub term: String,
    pub year: i32,
    pub scores: serde_json::Value,
    pub total: i32,
    pub mean: f64,
    pub grade: String,
    pub remarks: Option<String>,
}
