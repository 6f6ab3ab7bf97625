//! Portal services: ORM calls plus the small pieces of domain logic.

pub mod career_service;
pub mod counseling_service;
pub mod fee_service;
pub mod gallery_service;
pub mod password_reset_service;
pub mod registration_service;
pub mod result_service;
pub mod school_info_service;
pub mod staff_service;
pub mod subscriber_service;
pub mod testimonial_service;
pub mod user_service;
