//! testimonials: quotes from parents, alumni and students for the home page.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::testimonials;

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = testimonials)]
pub struct Testimonial {
    pub id: i64,
    pub author_name: String,
    pub author_role: String,
    pub quote: String,
    pub photo_url: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = testimonials)]
pub struct NewTestimonial {
    pub author_name: String,
    pub author_role: String,
    pub quote: String,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Default, AsChangeset, Deserialize)]
#[diesel(table_name = testimonials)]
pub struct TestimonialChanges {
    pub author_name: Option<String>,
    pub author_role: Option<String>,
    pub quote: Option<String>,
    pub photo_url: Option<String>,
    pub published: Option<bool>,
}

impl TestimonialChanges {
    pub fn is_empty(&self) -> bool {
        self.author_name.is_none()
            && self.author_role.is_none()
            && self.quote.is_none()
            && self.photo_url.is_none()
            && self.published.is_none()
    }
}
