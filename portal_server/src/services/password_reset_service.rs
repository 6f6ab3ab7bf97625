//! Password reset tokens.
//!
//! The plain token only ever leaves the server inside the reset email; the
//! database keeps its SHA-256 hex digest. Confirming a reset re-hashes the
//! supplied token, and on success deletes every reset row of the user, so a
//! token works at most once. Expired rows are deleted when they are presented
//! and swept on each new request.

use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::models::password_reset::{NewPasswordReset, PasswordReset};
use crate::models::user::User;
use crate::schema::{password_resets, users};

const TOKEN_BYTES: usize = 32;

/// A freshly issued token, to be mailed to the user.
#[derive(Debug)]
pub struct IssuedReset {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// 64 hex chars of OS randomness.
pub fn generate_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.trim().as_bytes()))
}

fn invalid_token() -> anyhow::Error {
    ApiError::validation("invalid or expired token").into()
}

/// Delete all expired reset rows.
pub async fn purge_expired(conn: &mut AsyncPgConnection) -> anyhow::Result<usize> {
    let deleted = diesel::delete(password_resets::table.filter(password_resets::expires_at.le(Utc::now())))
        .execute(conn)
        .await?;
    if deleted > 0 {
        tracing::debug!(deleted, "Purged expired password resets");
    }
    Ok(deleted)
}

/// Replace any outstanding reset for `user_id` with a new one.
pub async fn create_reset(
    conn: &mut AsyncPgConnection,
    user_id: i64,
    ttl_secs: i64,
) -> anyhow::Result<IssuedReset> {
    purge_expired(conn).await?;
    diesel::delete(password_resets::table.filter(password_resets::user_id.eq(user_id)))
        .execute(conn)
        .await?;

    let token = generate_token();
    let expires_at = Utc::now() + Duration::seconds(ttl_secs);
    diesel::insert_into(password_resets::table)
        .values(&NewPasswordReset {
            user_id,
            token_hash: hash_token(&token),
            expires_at,
        })
        .execute(conn)
        .await?;

    crate::metrics::password_reset("requested");
    tracing::info!(user_id, %expires_at, "Password reset issued");
    Ok(IssuedReset { token, expires_at })
}

/// What happened to a presented token once its row was claimed.
enum Redemption {
    Completed(User),
    Expired(i64),
    Unknown,
}

/// Consume `token` and set the user's password hash.
///
/// The reset row is deleted with `RETURNING` inside the transaction, so of
/// two concurrent confirmations of one token only one claims the row.
pub async fn confirm_reset(
    conn: &mut AsyncPgConnection,
    token: &str,
    new_password_hash: String,
) -> anyhow::Result<User> {
    let token_hash = hash_token(token);
    let now = Utc::now();
    let redemption = conn
        .transaction::<Redemption, anyhow::Error, _>(|conn| {
            async move {
                let claimed = diesel::delete(password_resets::table.filter(password_resets::token_hash.eq(token_hash)))
                    .returning(PasswordReset::as_returning())
                    .get_result::<PasswordReset>(conn)
                    .await
                    .optional()?;
                let Some(reset) = claimed else {
                    return Ok(Redemption::Unknown);
                };
                if reset.is_expired(now) {
                    return Ok(Redemption::Expired(reset.user_id));
                }
                let user = diesel::update(users::table.find(reset.user_id))
                    .set((
                        users::password_hash.eq(new_password_hash),
                        users::updated_at.eq(now),
                    ))
                    .get_result::<User>(conn)
                    .await?;
                diesel::delete(password_resets::table.filter(password_resets::user_id.eq(reset.user_id)))
                    .execute(conn)
                    .await?;
                Ok(Redemption::Completed(user))
            }
            .scope_boxed()
        })
        .await?;

    match redemption {
        Redemption::Completed(user) => {
            crate::metrics::password_reset("completed");
            tracing::info!(user_id = user.id, "Password reset completed");
            Ok(user)
        }
        Redemption::Expired(user_id) => {
            crate::metrics::password_reset("expired");
            tracing::info!(user_id, "Expired password reset presented");
            Err(invalid_token())
        }
        Redemption::Unknown => {
            crate::metrics::password_reset("invalid");
            Err(invalid_token())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn hash_is_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_token(" abc\n"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }

    #[test]
    fn expiry_boundary() {
        let now = Utc::now();
        let reset = PasswordReset {
            id: 1,
            user_id: 1,
            token_hash: hash_token("t"),
            expires_at: now + Duration::hours(1),
            created_at: now,
        };
        assert!(!reset.is_expired(now));
        assert!(!reset.is_expired(now + Duration::minutes(59)));
        assert!(reset.is_expired(now + Duration::hours(1)));
        assert!(reset.is_expired(now + Duration::hours(2)));
    }
}
