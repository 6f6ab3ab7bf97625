//! Testimonials for the marketing pages.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::testimonial::{NewTestimonial, Testimonial, TestimonialChanges};
use crate::schema::testimonials;

pub async fn list_testimonials(conn: &mut AsyncPgConnection, published_only: bool) -> anyhow::Result<Vec<Testimonial>> {
    let mut query = testimonials::table
        .order(testimonials::id.desc())
        .into_boxed();
    if published_only {
        query = query.filter(testimonials::published.eq(true));
    }
    let results = query.load::<Testimonial>(conn).await?;
    Ok(results)
}

pub async fn create_testimonial(
    conn: &mut AsyncPgConnection,
    new_testimonial: NewTestimonial,
) -> anyhow::Result<Testimonial> {
    let result = diesel::insert_into(testimonials::table)
        .values(&new_testimonial)
        .get_result::<Testimonial>(conn)
        .await?;
    Ok(result)
}

pub async fn update_testimonial(
    conn: &mut AsyncPgConnection,
    testimonial_id: i64,
    changes: TestimonialChanges,
) -> anyhow::Result<Testimonial> {
    let result = diesel::update(testimonials::table.find(testimonial_id))
        .set(&changes)
        .get_result::<Testimonial>(conn)
        .await?;
    Ok(result)
}

pub async fn delete_testimonial(conn: &mut AsyncPgConnection, testimonial_id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(testimonials::table.find(testimonial_id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}
