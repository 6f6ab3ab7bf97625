//! Newsletter subscribers and signed unsubscribe links.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ApiError;
use crate::models::subscriber::{NewSubscriber, Subscriber};
use crate::schema::subscribers;

type HmacSha256 = Hmac<Sha256>;

/// Outcome of a subscribe call.
#[derive(Debug)]
pub enum Subscription {
    Created(Subscriber),
    Reactivated(Subscriber),
}

fn mac_for(secret: &str, email: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(email.to_lowercase().as_bytes());
    Some(mac)
}

/// Hex HMAC-SHA256 of the address, used in unsubscribe links.
pub fn unsubscribe_token(secret: &str, email: &str) -> String {
    mac_for(secret, email)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Constant-time check of an unsubscribe token.
pub fn verify_unsubscribe_token(secret: &str, email: &str, token: &str) -> bool {
    let sig_bytes = match hex::decode(token.trim()) {
        Ok(b) => b,
        Err(_) => return false,
    };
    match mac_for(secret, email) {
        Some(mac) => mac.verify_slice(&sig_bytes).is_ok(),
        None => false,
    }
}

pub fn unsubscribe_link(base_url: &str, secret: &str, email: &str) -> String {
    let token = unsubscribe_token(secret, email);
    let query = serde_urlencoded::to_string([("email", email), ("token", token.as_str())]).unwrap_or_default();
    format!("{}/api/subscribers/unsubscribe?{query}", base_url.trim_end_matches('/'))
}

pub async fn find_by_email(conn: &mut AsyncPgConnection, email: &str) -> anyhow::Result<Option<Subscriber>> {
    let result = subscribers::table
        .filter(subscribers::email.eq(email))
        .first::<Subscriber>(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Add `email` to the list. Active duplicates conflict; unsubscribed
/// addresses are switched back on.
pub async fn subscribe(conn: &mut AsyncPgConnection, email: &str) -> anyhow::Result<Subscription> {
    match find_by_email(conn, email).await? {
        Some(existing) if existing.active => {
            Err(ApiError::Conflict(format!("{email} is already subscribed")).into())
        }
        Some(existing) => {
            let result = diesel::update(subscribers::table.find(existing.id))
                .set((
                    subscribers::active.eq(true),
                    subscribers::unsubscribed_at.eq(None::<chrono::DateTime<chrono::Utc>>),
                ))
                .get_result::<Subscriber>(conn)
                .await?;
            crate::metrics::subscription_changed("reactivated");
            Ok(Subscription::Reactivated(result))
        }
        None => {
            let result = diesel::insert_into(subscribers::table)
                .values(&NewSubscriber {
                    email: email.to_string(),
                    active: true,
                })
                .get_result::<Subscriber>(conn)
                .await?;
            crate::metrics::subscription_changed("created");
            tracing::info!(subscriber_id = result.id, "Newsletter subscriber added");
            Ok(Subscription::Created(result))
        }
    }
}

pub async fn unsubscribe(conn: &mut AsyncPgConnection, email: &str) -> anyhow::Result<Option<Subscriber>> {
    let result = diesel::update(subscribers::table.filter(subscribers::email.eq(email)))
        .set((
            subscribers::active.eq(false),
            subscribers::unsubscribed_at.eq(Some(chrono::Utc::now())),
        ))
        .get_result::<Subscriber>(conn)
        .await
        .optional()?;
    if result.is_some() {
        crate::metrics::subscription_changed("unsubscribed");
    }
    Ok(result)
}

pub async fn list_subscribers(conn: &mut AsyncPgConnection, active_only: bool) -> anyhow::Result<Vec<Subscriber>> {
    let mut query = subscribers::table.order(subscribers::id.asc()).into_boxed();
    if active_only {
        query = query.filter(subscribers::active.eq(true));
    }
    let results = query.load::<Subscriber>(conn).await?;
    Ok(results)
}

pub async fn delete_subscriber(conn: &mut AsyncPgConnection, subscriber_id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(subscribers::table.find(subscriber_id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}
