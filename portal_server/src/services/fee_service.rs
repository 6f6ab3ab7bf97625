//! Fee records and balance statements.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;

use crate::models::fee::{FeeRecord, FeeRecordChanges, NewFeeRecord};
use crate::schema::fee_records;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeStatus {
    Completed,
    Overpaid,
    Partial,
    Pending,
}

/// Classify a balance by comparing what was paid against what is due.
pub fn classify(amount_due: i64, amount_paid: i64) -> FeeStatus {
    let balance = amount_due - amount_paid;
    if balance < 0 {
        FeeStatus::Overpaid
    } else if balance == 0 && amount_due > 0 {
        FeeStatus::Completed
    } else if amount_paid > 0 && balance > 0 {
        FeeStatus::Partial
    } else {
        FeeStatus::Pending
    }
}

#[derive(Debug, Serialize)]
pub struct FeeLine {
    #[serde(flatten)]
    pub record: FeeRecord,
    pub balance: i64,
    pub status: FeeStatus,
}

#[derive(Debug, Serialize)]
pub struct FeeStatement {
    pub admission_number: String,
    pub records: Vec<FeeLine>,
    pub total_due: i64,
    pub total_paid: i64,
    pub balance: i64,
    pub status: FeeStatus,
}

pub fn build_statement(admission_number: &str, records: Vec<FeeRecord>) -> FeeStatement {
    let total_due = records.iter().map(|r| r.amount_due).sum::<i64>();
    let total_paid = records.iter().map(|r| r.amount_paid).sum::<i64>();
    let records = records
        .into_iter()
        .map(|record| FeeLine {
            balance: record.amount_due - record.amount_paid,
            status: classify(record.amount_due, record.amount_paid),
            record,
        })
        .collect();

    FeeStatement {
        admission_number: admission_number.to_string(),
        records,
        total_due,
        total_paid,
        balance: total_due - total_paid,
        status: classify(total_due, total_paid),
    }
}

/// Statement for one student, or `None` when there are no records.
pub async fn fee_statement(
    conn: &mut AsyncPgConnection,
    admission_number: &str,
) -> anyhow::Result<Option<FeeStatement>> {
    let records = fee_records::table
        .filter(fee_records::admission_number.eq(admission_number))
        .order((fee_records::year.asc(), fee_records::term.asc()))
        .load::<FeeRecord>(conn)
        .await?;
    if records.is_empty() {
        return Ok(None);
    }
    Ok(Some(build_statement(admission_number, records)))
}

pub async fn create_record(conn: &mut AsyncPgConnection, new_record: NewFeeRecord) -> anyhow::Result<FeeRecord> {
    let result = diesel::insert_into(fee_records::table)
        .values(&new_record)
        .get_result::<FeeRecord>(conn)
        .await?;
    tracing::info!(
        fee_record_id = result.id,
        admission_number = %result.admission_number,
        "Fee record created"
    );
    Ok(result)
}

pub async fn update_record(
    conn: &mut AsyncPgConnection,
    record_id: i64,
    mut changes: FeeRecordChanges,
) -> anyhow::Result<FeeRecord> {
    changes.updated_at = Some(chrono::Utc::now());
    let result = diesel::update(fee_records::table.find(record_id))
        .set(&changes)
        .get_result::<FeeRecord>(conn)
        .await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(term: &str, due: i64, paid: i64) -> FeeRecord {
        FeeRecord {
            id: 1,
            admission_number: "ADM/2024/0001".to_string(),
            term: term.to_string(),
            year: 2024,
            amount_due: due,
            amount_paid: paid,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(classify(30_000, 30_000), FeeStatus::Completed);
        assert_eq!(classify(30_000, 35_000), FeeStatus::Overpaid);
        assert_eq!(classify(30_000, 10_000), FeeStatus::Partial);
        assert_eq!(classify(30_000, 0), FeeStatus::Pending);
        assert_eq!(classify(0, 0), FeeStatus::Pending);
        assert_eq!(classify(0, 500), FeeStatus::Overpaid);
    }

    #[test]
    fn statement_aggregates_terms() {
        let statement = build_statement(
            "ADM/2024/0001",
            vec![record("term_1", 30_000, 30_000), record("term_2", 30_000, 12_000)],
        );
        assert_eq!(statement.total_due, 60_000);
        assert_eq!(statement.total_paid, 42_000);
        assert_eq!(statement.balance, 18_000);
        assert_eq!(statement.status, FeeStatus::Partial);
        assert_eq!(statement.records[0].status, FeeStatus::Completed);
        assert_eq!(statement.records[1].balance, 18_000);

        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json["status"], "partial");
        assert_eq!(json["records"][1]["term"], "term_2");
    }
}
