//! Admission applications.

use chrono::Datelike;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::ApiError;
use crate::models::registration::{NewRegistration, Registration};
use crate::schema::registrations;

pub const STATUSES: &[&str] = &["pending", "approved", "rejected", "enrolled"];
pub const GENDERS: &[&str] = &["male", "female", "other"];

/// Whether an application may move from `from` to `to`.
pub fn transition_allowed(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        ("pending", "approved") | ("pending", "rejected") | ("approved", "enrolled") | ("approved", "rejected")
    )
}

/// Admission number assigned on approval, e.g. `ADM/2025/0042`.
pub fn admission_number_for(year: i32, registration_id: i64) -> String {
    format!("ADM/{year}/{registration_id:04}")
}

pub async fn create_registration(
    conn: &mut AsyncPgConnection,
    new_registration: NewRegistration,
) -> anyhow::Result<Registration> {
    let result = diesel::insert_into(registrations::table)
        .values(&new_registration)
        .get_result::<Registration>(conn)
        .await?;
    crate::metrics::application_received("admission");
    tracing::info!(registration_id = result.id, grade = %result.grade_applying, "Admission application received");
    Ok(result)
}

pub async fn list_registrations(
    conn: &mut AsyncPgConnection,
    status: Option<&str>,
) -> anyhow::Result<Vec<Registration>> {
    let mut query = registrations::table
        .order(registrations::id.desc())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(registrations::status.eq(status.to_string()));
    }
    let results = query.load::<Registration>(conn).await?;
    Ok(results)
}

pub async fn get_registration(
    conn: &mut AsyncPgConnection,
    registration_id: i64,
) -> anyhow::Result<Option<Registration>> {
    let result = registrations::table
        .find(registration_id)
        .first::<Registration>(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Move an application to `status`; approval assigns the admission number.
pub async fn update_status(
    conn: &mut AsyncPgConnection,
    registration_id: i64,
    status: &str,
) -> anyhow::Result<Registration> {
    let current = get_registration(conn, registration_id)
        .await?
        .ok_or_else(|| ApiError::not_found("registration"))?;

    if !transition_allowed(&current.status, status) {
        return Err(ApiError::validation(format!(
            "cannot move registration from {} to {}",
            current.status, status
        ))
        .into());
    }

    let admission_number = match (&current.admission_number, status) {
        (Some(existing), _) => Some(existing.clone()),
        (None, "approved") => Some(admission_number_for(
            chrono::Utc::now().year(),
            current.id,
        )),
        (None, _) => None,
    };

    let result = diesel::update(registrations::table.find(registration_id))
        .set((
            registrations::status.eq(status),
            registrations::admission_number.eq(admission_number),
            registrations::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result::<Registration>(conn)
        .await?;

    tracing::info!(
        registration_id,
        from = %current.status,
        to = status,
        "Registration status changed"
    );
    Ok(result)
}

pub async fn delete_registration(conn: &mut AsyncPgConnection, registration_id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(registrations::table.find(registration_id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_workflow() {
        assert!(transition_allowed("pending", "approved"));
        assert!(transition_allowed("pending", "rejected"));
        assert!(transition_allowed("approved", "enrolled"));
        assert!(!transition_allowed("pending", "enrolled"));
        assert!(!transition_allowed("rejected", "approved"));
        assert!(!transition_allowed("enrolled", "pending"));
    }

    #[test]
    fn admission_number_format() {
        assert_eq!(admission_number_for(2025, 42), "ADM/2025/0042");
        assert_eq!(admission_number_for(2025, 12345), "ADM/2025/12345");
    }
}
