//! The school_info singleton.

use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::school_info::{SchoolInfo, SchoolInfoForm, SCHOOL_INFO_ID};
use crate::schema::school_info;

pub async fn get_info(conn: &mut AsyncPgConnection) -> anyhow::Result<Option<SchoolInfo>> {
    let result = school_info::table
        .find(SCHOOL_INFO_ID)
        .first::<SchoolInfo>(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Insert or replace the singleton row.
pub async fn upsert_info(conn: &mut AsyncPgConnection, form: SchoolInfoForm) -> anyhow::Result<SchoolInfo> {
    let now = chrono::Utc::now();
    let result = diesel::insert_into(school_info::table)
        .values((
            school_info::id.eq(SCHOOL_INFO_ID),
            &form,
            school_info::updated_at.eq(now),
        ))
        .on_conflict(school_info::id)
        .do_update()
        .set((&form, school_info::updated_at.eq(excluded(school_info::updated_at))))
        .get_result::<SchoolInfo>(conn)
        .await?;
    tracing::info!("School info updated");
    Ok(result)
}

/// Insert the default row if the table is empty.
pub async fn ensure_default(conn: &mut AsyncPgConnection, form: SchoolInfoForm) -> anyhow::Result<()> {
    diesel::insert_into(school_info::table)
        .values((school_info::id.eq(SCHOOL_INFO_ID), &form))
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;
    Ok(())
}
