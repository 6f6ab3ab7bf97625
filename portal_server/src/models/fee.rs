//! fee_records: per-term fee charges and payments by admission number.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::fee_records;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = fee_records)]
pub struct FeeRecord {
    pub id: i64,
    pub admission_number: String,
    pub term: String,
    pub year: i32,
    pub amount_due: i64,
    pub amount_paid: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = fee_records)]
pub struct NewFeeRecord {
    pub admission_number: String,
    pub term: String,
    pub year: i32,
    pub amount_due: i64,
    #[serde(default)]
    pub amount_paid: i64,
}

#[derive(Debug, Default, AsChangeset, Deserialize)]
#[diesel(table_name = fee_records)]
pub struct FeeRecordChanges {
    pub amount_due: Option<i64>,
    pub amount_paid: Option<i64>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}
