//! User accounts.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::user::{NewUser, User, UserChanges};
use crate::schema::users;

/// Find a user by (lowercased) email.
pub async fn find_by_email(conn: &mut AsyncPgConnection, email: &str) -> anyhow::Result<Option<User>> {
    let result = users::table
        .filter(users::email.eq(email.to_lowercase()))
        .first::<User>(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn get_user(conn: &mut AsyncPgConnection, user_id: i64) -> anyhow::Result<Option<User>> {
    let result = users::table
        .find(user_id)
        .first::<User>(conn)
        .await
        .optional()?;
    Ok(result)
}

/// List users, optionally restricted to one role.
pub async fn list_users(conn: &mut AsyncPgConnection, role: Option<&str>) -> anyhow::Result<Vec<User>> {
    let mut query = users::table.order(users::id.asc()).into_boxed();
    if let Some(role) = role {
        query = query.filter(users::role.eq(role.to_string()));
    }
    let results = query.load::<User>(conn).await?;
    Ok(results)
}

/// Users holding an admission number (student and parent accounts).
pub async fn list_by_admission_number(
    conn: &mut AsyncPgConnection,
    admission_number: &str,
) -> anyhow::Result<Vec<User>> {
    let results = users::table
        .filter(users::admission_number.eq(admission_number))
        .order(users::id.asc())
        .load::<User>(conn)
        .await?;
    Ok(results)
}

pub async fn create_user(conn: &mut AsyncPgConnection, new_user: NewUser) -> anyhow::Result<User> {
    let result = diesel::insert_into(users::table)
        .values(&new_user)
        .get_result::<User>(conn)
        .await?;

    tracing::info!(user_id = result.id, role = %result.role, "User created");
    Ok(result)
}

pub async fn update_user(
    conn: &mut AsyncPgConnection,
    user_id: i64,
    mut changes: UserChanges,
) -> anyhow::Result<User> {
    changes.updated_at = Some(chrono::Utc::now());
    let result = diesel::update(users::table.find(user_id))
        .set(&changes)
        .get_result::<User>(conn)
        .await?;
    Ok(result)
}

/// Delete a user. Returns whether a row was removed.
pub async fn delete_user(conn: &mut AsyncPgConnection, user_id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(users::table.find(user_id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}
