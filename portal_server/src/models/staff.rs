//! staff_members: the public staff directory.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::staff_members;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = staff_members)]
pub struct StaffMember {
    pub id: i64,
    pub full_name: String,
    pub title: String,
    pub department: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
    pub display_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = staff_members)]
pub struct NewStaffMember {
    pub full_name: String,
    pub title: String,
    pub department: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, AsChangeset, Deserialize)]
#[diesel(table_name = staff_members)]
pub struct StaffMemberChanges {
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
    pub display_order: Option<i32>,
    pub active: Option<bool>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}
