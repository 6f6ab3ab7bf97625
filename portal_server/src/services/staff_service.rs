//! Staff directory.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::staff::{NewStaffMember, StaffMember, StaffMemberChanges};
use crate::schema::staff_members;

/// Directory listing in display order; `department` filters case-insensitively.
pub async fn list_staff(
    conn: &mut AsyncPgConnection,
    department: Option<&str>,
    include_inactive: bool,
) -> anyhow::Result<Vec<StaffMember>> {
    let mut query = staff_members::table
        .order((staff_members::display_order.asc(), staff_members::full_name.asc()))
        .into_boxed();
    if !include_inactive {
        query = query.filter(staff_members::active.eq(true));
    }
    if let Some(department) = department {
        query = query.filter(staff_members::department.ilike(crate::validation::like_literal(department)));
    }
    let results = query.load::<StaffMember>(conn).await?;
    Ok(results)
}

pub async fn get_staff_member(conn: &mut AsyncPgConnection, staff_id: i64) -> anyhow::Result<Option<StaffMember>> {
    let result = staff_members::table
        .find(staff_id)
        .first::<StaffMember>(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn create_staff_member(
    conn: &mut AsyncPgConnection,
    new_member: NewStaffMember,
) -> anyhow::Result<StaffMember> {
    let result = diesel::insert_into(staff_members::table)
        .values(&new_member)
        .get_result::<StaffMember>(conn)
        .await?;
    Ok(result)
}

pub async fn update_staff_member(
    conn: &mut AsyncPgConnection,
    staff_id: i64,
    mut changes: StaffMemberChanges,
) -> anyhow::Result<StaffMember> {
    changes.updated_at = Some(chrono::Utc::now());
    let result = diesel::update(staff_members::table.find(staff_id))
        .set(&changes)
        .get_result::<StaffMember>(conn)
        .await?;
    Ok(result)
}

pub async fn delete_staff_member(conn: &mut AsyncPgConnection, staff_id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(staff_members::table.find(staff_id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}
