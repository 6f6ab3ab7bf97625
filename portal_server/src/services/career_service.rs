//! Career vacancies and applications.

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::error::ApiError;
use crate::models::career::{
    CareerApplication, CareerJob, CareerJobChanges, NewCareerApplication, NewCareerJob,
};
use crate::schema::{career_applications, career_jobs};

pub const EMPLOYMENT_TYPES: &[&str] = &["full_time", "part_time", "contract", "internship"];
pub const APPLICATION_STATUSES: &[&str] = &["received", "shortlisted", "rejected", "hired"];

/// Whether an application may move from `from` to `to`.
pub fn application_transition_allowed(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        ("received", "shortlisted")
            | ("received", "rejected")
            | ("shortlisted", "hired")
            | ("shortlisted", "rejected")
    )
}

/// List vacancies. Public callers only see active ones.
pub async fn list_jobs(
    conn: &mut AsyncPgConnection,
    department: Option<&str>,
    include_inactive: bool,
) -> anyhow::Result<Vec<CareerJob>> {
    let mut query = career_jobs::table
        .order((career_jobs::created_at.desc(), career_jobs::id.desc()))
        .into_boxed();
    if !include_inactive {
        query = query.filter(career_jobs::active.eq(true));
    }
    if let Some(department) = department {
        query = query.filter(career_jobs::department.ilike(crate::validation::like_literal(department)));
    }
    let results = query.load::<CareerJob>(conn).await?;
    Ok(results)
}

pub async fn get_job(conn: &mut AsyncPgConnection, job_id: i64) -> anyhow::Result<Option<CareerJob>> {
    let result = career_jobs::table
        .find(job_id)
        .first::<CareerJob>(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn create_job(conn: &mut AsyncPgConnection, new_job: NewCareerJob) -> anyhow::Result<CareerJob> {
    let result = diesel::insert_into(career_jobs::table)
        .values(&new_job)
        .get_result::<CareerJob>(conn)
        .await?;
    tracing::info!(job_id = result.id, title = %result.title, "Career job created");
    Ok(result)
}

pub async fn update_job(
    conn: &mut AsyncPgConnection,
    job_id: i64,
    mut changes: CareerJobChanges,
) -> anyhow::Result<CareerJob> {
    changes.updated_at = Some(chrono::Utc::now());
    let result = diesel::update(career_jobs::table.find(job_id))
        .set(&changes)
        .get_result::<CareerJob>(conn)
        .await?;
    Ok(result)
}

/// Delete a job and its applications. Returns the stored résumé keys of the
/// removed applications, or `None` when the job did not exist.
pub async fn delete_job(conn: &mut AsyncPgConnection, job_id: i64) -> anyhow::Result<Option<Vec<String>>> {
    conn.transaction::<Option<Vec<String>>, anyhow::Error, _>(|conn| {
        async move {
            let resume_keys: Vec<Option<String>> =
                diesel::delete(career_applications::table.filter(career_applications::job_id.eq(job_id)))
                    .returning(career_applications::resume_key)
                    .get_results(conn)
                    .await?;
            let deleted = diesel::delete(career_jobs::table.find(job_id))
                .execute(conn)
                .await?;
            if deleted == 0 {
                return Ok(None);
            }
            Ok(Some(resume_keys.into_iter().flatten().collect()))
        }
        .scope_boxed()
    })
    .await
}

pub async fn create_application(
    conn: &mut AsyncPgConnection,
    new_application: NewCareerApplication,
) -> anyhow::Result<CareerApplication> {
    let result = diesel::insert_into(career_applications::table)
        .values(&new_application)
        .get_result::<CareerApplication>(conn)
        .await?;

    crate::metrics::application_received("career");
    tracing::info!(
        application_id = result.id,
        job_id = result.job_id,
        "Career application received"
    );
    Ok(result)
}

/// Whether `email` already applied for `job_id`.
pub async fn has_applied(conn: &mut AsyncPgConnection, job_id: i64, email: &str) -> anyhow::Result<bool> {
    let count: i64 = career_applications::table
        .filter(career_applications::job_id.eq(job_id))
        .filter(career_applications::email.eq(email))
        .count()
        .get_result(conn)
        .await?;
    Ok(count > 0)
}

pub async fn list_applications(
    conn: &mut AsyncPgConnection,
    job_id: i64,
    status: Option<&str>,
) -> anyhow::Result<Vec<CareerApplication>> {
    let mut query = career_applications::table
        .filter(career_applications::job_id.eq(job_id))
        .order(career_applications::id.asc())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(career_applications::status.eq(status.to_string()));
    }
    let results = query.load::<CareerApplication>(conn).await?;
    Ok(results)
}

/// Move an application to `status`, enforcing the allowed transitions.
pub async fn update_application_status(
    conn: &mut AsyncPgConnection,
    application_id: i64,
    status: &str,
) -> anyhow::Result<CareerApplication> {
    let current: CareerApplication = career_applications::table
        .find(application_id)
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::not_found("application"))?;

    if !application_transition_allowed(&current.status, status) {
        return Err(ApiError::validation(format!(
            "cannot move application from {} to {}",
            current.status, status
        ))
        .into());
    }

    let result = diesel::update(career_applications::table.find(application_id))
        .set((
            career_applications::status.eq(status),
            career_applications::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result::<CareerApplication>(conn)
        .await?;
    tracing::info!(application_id, status, "Career application status changed");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_workflow() {
        assert!(application_transition_allowed("received", "shortlisted"));
        assert!(application_transition_allowed("shortlisted", "hired"));
        assert!(application_transition_allowed("received", "rejected"));
        assert!(!application_transition_allowed("received", "hired"));
        assert!(!application_transition_allowed("rejected", "shortlisted"));
        assert!(!application_transition_allowed("hired", "rejected"));
    }
}
