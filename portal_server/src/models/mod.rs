//! Portal data models: one row struct per table, plus insert/changeset shapes.

pub mod career;
pub mod counseling;
pub mod fee;
pub mod gallery;
pub mod password_reset;
pub mod registration;
pub mod school_info;
pub mod staff;
pub mod student_result;
pub mod subscriber;
pub mod testimonial;
pub mod user;
