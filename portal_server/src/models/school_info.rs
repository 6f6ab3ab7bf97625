//! school_info: the single row of public school details.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::school_info;

/// Primary key of the one and only school_info row.
pub const SCHOOL_INFO_ID: i64 = 1;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = school_info)]
pub struct SchoolInfo {
    pub id: i64,
    pub name: String,
    pub motto: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub about: Option<String>,
    pub mission: Option<String>,
    pub vision: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset, Deserialize)]
#[diesel(table_name = school_info)]
pub struct SchoolInfoForm {
    pub name: String,
    pub motto: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub about: Option<String>,
    pub mission: Option<String>,
    pub vision: Option<String>,
}
