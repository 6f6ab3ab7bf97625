//! Diesel table definitions for the school portal.
//!
//! Tables: users, password_resets, career_jobs, career_applications,
//! gallery_images, counseling_events, school_info, subscribers,
//! student_results, registrations, fee_records, testimonials, staff_members.

diesel::table! {
    users (id) {
        id -> Int8,
        full_name -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        role -> Varchar,
        admission_number -> Nullable<Varchar>,
        active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    password_resets (id) {
        id -> Int8,
        user_id -> Int8,
        token_hash -> Varchar,
        expires_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    career_jobs (id) {
        id -> Int8,
        title -> Varchar,
        department -> Varchar,
        employment_type -> Varchar,
        location -> Nullable<Varchar>,
        description -> Text,
        requirements -> Nullable<Text>,
        deadline -> Nullable<Date>,
        active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    career_applications (id) {
        id -> Int8,
        job_id -> Int8,
        full_name -> Varchar,
        email -> Varchar,
        phone -> Varchar,
        cover_letter -> Nullable<Text>,
        resume_key -> Nullable<Varchar>,
        resume_url -> Nullable<Varchar>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    gallery_images (id) {
        id -> Int8,
        title -> Varchar,
        caption -> Nullable<Text>,
        category -> Varchar,
        storage_key -> Varchar,
        url -> Varchar,
        content_type -> Varchar,
        size_bytes -> Int8,
        uploaded_by -> Nullable<Int8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    counseling_events (id) {
        id -> Int8,
        title -> Varchar,
        description -> Text,
        counselor -> Nullable<Varchar>,
        audience -> Varchar,
        location -> Nullable<Varchar>,
        event_date -> Date,
        start_time -> Nullable<Time>,
        end_time -> Nullable<Time>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    school_info (id) {
        id -> Int8,
        name -> Varchar,
        motto -> Nullable<Varchar>,
        email -> Varchar,
        phone -> Varchar,
        address -> Varchar,
        about -> Nullable<Text>,
        mission -> Nullable<Text>,
        vision -> Nullable<Text>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    subscribers (id) {
        id -> Int8,
        email -> Varchar,
        active -> Bool,
        created_at -> Timestamptz,
        unsubscribed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    student_results (id) {
        id -> Int8,
        admission_number -> Varchar,
        student_name -> Varchar,
        class_name -> Varchar,
        term -> Varchar,
        year -> Int4,
        scores -> Jsonb,
        total -> Int4,
        mean -> Float8,
        grade -> Varchar,
        remarks -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    registrations (id) {
        id -> Int8,
        student_name -> Varchar,
        date_of_birth -> Date,
        gender -> Varchar,
        grade_applying -> Varchar,
        previous_school -> Nullable<Varchar>,
        parent_name -> Varchar,
        parent_email -> Varchar,
        parent_phone -> Varchar,
        notes -> Nullable<Text>,
        status -> Varchar,
        admission_number -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    fee_records (id) {
        id -> Int8,
        admission_number -> Varchar,
        term -> Varchar,
        year -> Int4,
        amount_due -> Int8,
        amount_paid -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    testimonials (id) {
        id -> Int8,
        author_name -> Varchar,
        author_role -> Varchar,
        quote -> Text,
        photo_url -> Nullable<Varchar>,
        published -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    staff_members (id) {
        id -> Int8,
        full_name -> Varchar,
        title -> Varchar,
        department -> Varchar,
        bio -> Nullable<Text>,
        photo_url -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        display_order -> Int4,
        active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(password_resets -> users (user_id));
diesel::joinable!(career_applications -> career_jobs (job_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    password_resets,
    career_jobs,
    career_applications,
    gallery_images,
    counseling_events,
    school_info,
    subscribers,
    student_results,
    registrations,
    fee_records,
    testimonials,
    staff_members,
);
