//! Bootstrap SQL for the portal tables.

use diesel_async::AsyncPgConnection;
use diesel_async::SimpleAsyncConnection;

/// Idempotent schema bootstrap, safe to run on every start.
pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id                  BIGSERIAL PRIMARY KEY,
    full_name           VARCHAR(255) NOT NULL,
    email               VARCHAR(255) NOT NULL UNIQUE,
    password_hash       VARCHAR(255) NOT NULL,
    role                VARCHAR(32) NOT NULL DEFAULT 'student',
    admission_number    VARCHAR(64),
    active              BOOLEAN NOT NULL DEFAULT TRUE,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_users_admission ON users (admission_number);

CREATE TABLE IF NOT EXISTS password_resets (
    id              BIGSERIAL PRIMARY KEY,
    user_id         BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token_hash      VARCHAR(64) NOT NULL UNIQUE,
    expires_at      TIMESTAMPTZ NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_password_resets_user ON password_resets (user_id);

CREATE TABLE IF NOT EXISTS career_jobs (
    id              BIGSERIAL PRIMARY KEY,
    title           VARCHAR(255) NOT NULL,
    department      VARCHAR(128) NOT NULL,
    employment_type VARCHAR(32) NOT NULL DEFAULT 'full_time',
    location        VARCHAR(255),
    description     TEXT NOT NULL,
    requirements    TEXT,
    deadline        DATE,
    active          BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS career_applications (
    id              BIGSERIAL PRIMARY KEY,
    job_id          BIGINT NOT NULL REFERENCES career_jobs(id) ON DELETE CASCADE,
    full_name       VARCHAR(255) NOT NULL,
    email           VARCHAR(255) NOT NULL,
    phone           VARCHAR(32) NOT NULL,
    cover_letter    TEXT,
    resume_key      VARCHAR(512),
    resume_url      VARCHAR(1024),
    status          VARCHAR(32) NOT NULL DEFAULT 'received',
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (job_id, email)
);

CREATE TABLE IF NOT EXISTS gallery_images (
    id              BIGSERIAL PRIMARY KEY,
    title           VARCHAR(255) NOT NULL,
    caption         TEXT,
    category        VARCHAR(64) NOT NULL DEFAULT 'general',
    storage_key     VARCHAR(512) NOT NULL UNIQUE,
    url             VARCHAR(1024) NOT NULL,
    content_type    VARCHAR(64) NOT NULL,
    size_bytes      BIGINT NOT NULL,
    uploaded_by     BIGINT REFERENCES users(id) ON DELETE SET NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_gallery_category ON gallery_images (category);

CREATE TABLE IF NOT EXISTS counseling_events (
    id              BIGSERIAL PRIMARY KEY,
    title           VARCHAR(255) NOT NULL,
    description     TEXT NOT NULL,
    counselor       VARCHAR(255),
    audience        VARCHAR(64) NOT NULL DEFAULT 'all',
    location        VARCHAR(255),
    event_date      DATE NOT NULL,
    start_time      TIME,
    end_time        TIME,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_counseling_events_date ON counseling_events (event_date);

CREATE TABLE IF NOT EXISTS school_info (
    id              BIGINT PRIMARY KEY,
    name            VARCHAR(255) NOT NULL,
    motto           VARCHAR(255),
    email           VARCHAR(255) NOT NULL,
    phone           VARCHAR(32) NOT NULL,
    address         VARCHAR(512) NOT NULL,
    about           TEXT,
    mission         TEXT,
    vision          TEXT,
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS subscribers (
    id              BIGSERIAL PRIMARY KEY,
    email           VARCHAR(255) NOT NULL UNIQUE,
    active          BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    unsubscribed_at TIMESTAMPTZ
);

CREATE TABLE IF NOT EXISTS student_results (
    id               BIGSERIAL PRIMARY KEY,
    admission_number VARCHAR(64) NOT NULL,
    student_name     VARCHAR(255) NOT NULL,
    class_name       VARCHAR(64) NOT NULL,
    term             VARCHAR(32) NOT NULL,
    year             INTEGER NOT NULL,
    scores           JSONB NOT NULL,
    total            INTEGER NOT NULL,
    mean             DOUBLE PRECISION NOT NULL,
    grade            VARCHAR(4) NOT NULL,
    remarks          TEXT,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (admission_number, term, year)
);

CREATE TABLE IF NOT EXISTS registrations (
    id               BIGSERIAL PRIMARY KEY,
    student_name     VARCHAR(255) NOT NULL,
    date_of_birth    DATE NOT NULL,
    gender           VARCHAR(16) NOT NULL,
    grade_applying   VARCHAR(64) NOT NULL,
    previous_school  VARCHAR(255),
    parent_name      VARCHAR(255) NOT NULL,
    parent_email     VARCHAR(255) NOT NULL,
    parent_phone     VARCHAR(32) NOT NULL,
    notes            TEXT,
    status           VARCHAR(32) NOT NULL DEFAULT 'pending',
    admission_number VARCHAR(64) UNIQUE,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_registrations_status ON registrations (status);

CREATE TABLE IF NOT EXISTS fee_records (
    id               BIGSERIAL PRIMARY KEY,
    admission_number VARCHAR(64) NOT NULL,
    term             VARCHAR(32) NOT NULL,
    year             INTEGER NOT NULL,
    amount_due       BIGINT NOT NULL,
    amount_paid      BIGINT NOT NULL DEFAULT 0,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (admission_number, term, year)
);

CREATE TABLE IF NOT EXISTS testimonials (
    id              BIGSERIAL PRIMARY KEY,
    author_name     VARCHAR(255) NOT NULL,
    author_role     VARCHAR(128) NOT NULL,
    quote           TEXT NOT NULL,
    photo_url       VARCHAR(1024),
    published       BOOLEAN NOT NULL DEFAULT FALSE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS staff_members (
    id              BIGSERIAL PRIMARY KEY,
    full_name       VARCHAR(255) NOT NULL,
    title           VARCHAR(255) NOT NULL,
    department      VARCHAR(128) NOT NULL,
    bio             TEXT,
    photo_url       VARCHAR(1024),
    email           VARCHAR(255),
    display_order   INTEGER NOT NULL DEFAULT 0,
    active          BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Run the bootstrap SQL.
pub async fn run_migration(conn: &mut AsyncPgConnection) -> anyhow::Result<()> {
    conn.batch_execute(MIGRATION_SQL)
        .await
        .map_err(|e| anyhow::anyhow!("portal migration failed: {e}"))?;
    Ok(())
}
