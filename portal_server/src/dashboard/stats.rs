//! Back-office overview counts.

use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;

/// Admissions pipeline.
#[derive(Debug, Serialize, QueryableByName)]
pub struct RegistrationCounts {
    #[diesel(sql_type = BigInt)]
    pub total: i64,
    #[diesel(sql_type = BigInt)]
    pub pending: i64,
    #[diesel(sql_type = BigInt)]
    pub approved: i64,
    #[diesel(sql_type = BigInt)]
    pub rejected: i64,
    #[diesel(sql_type = BigInt)]
    pub enrolled: i64,
}

pub async fn query_registrations(conn: &mut AsyncPgConnection) -> anyhow::Result<RegistrationCounts> {
    let result = diesel::sql_query(
        "SELECT \
            COUNT(*) AS total, \
            COUNT(*) FILTER (WHERE status = 'pending') AS pending, \
            COUNT(*) FILTER (WHERE status = 'approved') AS approved, \
            COUNT(*) FILTER (WHERE status = 'rejected') AS rejected, \
            COUNT(*) FILTER (WHERE status = 'enrolled') AS enrolled \
         FROM registrations",
    )
    .get_result(conn)
    .await?;
    Ok(result)
}

/// Open vacancies and applications received in the last 30 days.
#[derive(Debug, Serialize, QueryableByName)]
pub struct CareerCounts {
    #[diesel(sql_type = BigInt)]
    pub open_jobs: i64,
    #[diesel(sql_type = BigInt)]
    pub applications_total: i64,
    #[diesel(sql_type = BigInt)]
    pub applications_recent: i64,
}

pub async fn query_careers(conn: &mut AsyncPgConnection) -> anyhow::Result<CareerCounts> {
    let result = diesel::sql_query(
        "SELECT \
            (SELECT COUNT(*) FROM career_jobs \
              WHERE active AND (deadline IS NULL OR deadline >= CURRENT_DATE)) AS open_jobs, \
            (SELECT COUNT(*) FROM career_applications) AS applications_total, \
            (SELECT COUNT(*) FROM career_applications \
              WHERE created_at >= NOW() - INTERVAL '30 days') AS applications_recent",
    )
    .get_result(conn)
    .await?;
    Ok(result)
}

#[derive(Debug, Serialize, QueryableByName)]
pub struct ContentCounts {
    #[diesel(sql_type = BigInt)]
    pub users: i64,
    #[diesel(sql_type = BigInt)]
    pub active_subscribers: i64,
    #[diesel(sql_type = BigInt)]
    pub gallery_images: i64,
    #[diesel(sql_type = BigInt)]
    pub upcoming_events: i64,
    #[diesel(sql_type = BigInt)]
    pub published_testimonials: i64,
    #[diesel(sql_type = BigInt)]
    pub staff_members: i64,
}

pub async fn query_content(conn: &mut AsyncPgConnection) -> anyhow::Result<ContentCounts> {
    let result = diesel::sql_query(
        "SELECT \
            (SELECT COUNT(*) FROM users WHERE active) AS users, \
            (SELECT COUNT(*) FROM subscribers WHERE active) AS active_subscribers, \
            (SELECT COUNT(*) FROM gallery_images) AS gallery_images, \
            (SELECT COUNT(*) FROM counseling_events WHERE event_date >= CURRENT_DATE) AS upcoming_events, \
            (SELECT COUNT(*) FROM testimonials WHERE published) AS published_testimonials, \
            (SELECT COUNT(*) FROM staff_members WHERE active) AS staff_members",
    )
    .get_result(conn)
    .await?;
    Ok(result)
}

/// Outstanding fee balances across all students.
#[derive(Debug, Serialize, QueryableByName)]
pub struct FeeCounts {
    #[diesel(sql_type = BigInt)]
    pub total_due: i64,
    #[diesel(sql_type = BigInt)]
    pub total_paid: i64,
    #[diesel(sql_type = BigInt)]
    pub students_with_balance: i64,
}

pub async fn query_fees(conn: &mut AsyncPgConnection) -> anyhow::Result<FeeCounts> {
    let result = diesel::sql_query(
        "SELECT \
            COALESCE(SUM(amount_due), 0)::bigint AS total_due, \
            COALESCE(SUM(amount_paid), 0)::bigint AS total_paid, \
            (SELECT COUNT(*) FROM ( \
                SELECT admission_number FROM fee_records \
                GROUP BY admission_number \
                HAVING SUM(amount_due) > SUM(amount_paid)) s) AS students_with_balance \
         FROM fee_records",
    )
    .get_result(conn)
    .await?;
    Ok(result)
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub registrations: RegistrationCounts,
    pub careers: CareerCounts,
    pub content: ContentCounts,
    pub fees: FeeCounts,
}

pub async fn overview(conn: &mut AsyncPgConnection) -> anyhow::Result<DashboardStats> {
    Ok(DashboardStats {
        registrations: query_registrations(conn).await?,
        careers: query_careers(conn).await?,
        content: query_content(conn).await?,
        fees: query_fees(conn).await?,
    })
}
