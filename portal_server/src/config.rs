//! Portal configuration: loaded from environment variables.

const DEV_JWT_SECRET: &str = "school-portal-dev-secret-change-me";

/// Where uploaded media is kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// Local directory, served by the portal under `/media`.
    Filesystem,
    /// Remote object storage reached over HTTP PUT/DELETE.
    Http,
}

#[derive(Clone, Debug)]
pub struct PortalConfig {
    /// HMAC secret for signing bearer tokens.
    pub jwt_secret: String,
    /// Lifetime of a login token in seconds.
    pub token_ttl_secs: i64,
    /// Lifetime of a password reset token in seconds.
    pub reset_token_ttl_secs: i64,
    /// Public site URL used to build links in emails.
    pub public_base_url: String,
    /// Secret for newsletter unsubscribe links.
    pub unsubscribe_secret: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Sender mailbox for transactional mail.
    pub mail_from: String,
    /// Office inbox that receives admissions and career notifications.
    pub school_notify_email: String,
    pub storage_backend: StorageBackend,
    /// Root directory for the filesystem backend.
    pub storage_path: String,
    /// Bucket URL for the HTTP backend.
    pub storage_endpoint: String,
    pub storage_token: String,
    /// Public prefix that stored keys are appended to.
    pub media_base_url: String,
    pub max_upload_bytes: usize,
    pub db_pool_size: usize,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
    /// First administrator, created on an empty database.
    pub admin_email: String,
    pub admin_password: String,
    pub request_timeout_secs: u64,
}

impl PortalConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();
        let token_ttl_secs = std::env::var("TOKEN_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86_400);
        let reset_token_ttl_secs = std::env::var("RESET_TOKEN_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3_600);
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let unsubscribe_secret = std::env::var("UNSUBSCRIBE_SECRET").unwrap_or_default();
        let smtp_host = std::env::var("SMTP_HOST").unwrap_or_default();
        let smtp_port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);
        let smtp_username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = std::env::var("SMTP_PASSWORD").unwrap_or_default();
        let mail_from = std::env::var("MAIL_FROM")
            .unwrap_or_else(|_| "School Office <no-reply@localhost>".to_string());
        let school_notify_email = std::env::var("SCHOOL_NOTIFY_EMAIL").unwrap_or_default();
        let storage_backend = match std::env::var("STORAGE_BACKEND").as_deref() {
            Ok("http") => StorageBackend::Http,
            _ => StorageBackend::Filesystem,
        };
        let storage_path =
            std::env::var("STORAGE_PATH").unwrap_or_else(|_| "./media".to_string());
        let storage_endpoint = std::env::var("STORAGE_ENDPOINT").unwrap_or_default();
        let storage_token = std::env::var("STORAGE_TOKEN").unwrap_or_default();
        let media_base_url =
            std::env::var("MEDIA_BASE_URL").unwrap_or_else(|_| "/media".to_string());
        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5 * 1024 * 1024);
        let db_pool_size = std::env::var("DB_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let admin_email = std::env::var("ADMIN_EMAIL").unwrap_or_default();
        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_default();
        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let jwt_secret = if jwt_secret.is_empty() {
            tracing::warn!("JWT_SECRET not set -- using the development signing secret");
            DEV_JWT_SECRET.to_string()
        } else {
            jwt_secret
        };
        let unsubscribe_secret = if unsubscribe_secret.is_empty() {
            jwt_secret.clone()
        } else {
            unsubscribe_secret
        };
        if smtp_host.is_empty() {
            tracing::warn!("SMTP_HOST not set -- outgoing mail will only be logged");
        }
        if storage_backend == StorageBackend::Http && storage_endpoint.is_empty() {
            tracing::warn!("STORAGE_BACKEND=http but STORAGE_ENDPOINT is empty");
        }

        Self {
            jwt_secret,
            token_ttl_secs,
            reset_token_ttl_secs,
            public_base_url,
            unsubscribe_secret,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            mail_from,
            school_notify_email,
            storage_backend,
            storage_path,
            storage_endpoint,
            storage_token,
            media_base_url,
            max_upload_bytes,
            db_pool_size,
            cors_origins,
            admin_email,
            admin_password,
            request_timeout_secs,
        }
    }

    /// Fixed configuration for tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            jwt_secret: "test-secret".to_string(),
            token_ttl_secs: 3_600,
            reset_token_ttl_secs: 3_600,
            public_base_url: "https://school.test".to_string(),
            unsubscribe_secret: "unsubscribe-secret".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            mail_from: "School Office <office@school.test>".to_string(),
            school_notify_email: "office@school.test".to_string(),
            storage_backend: StorageBackend::Filesystem,
            storage_path: "./media".to_string(),
            storage_endpoint: String::new(),
            storage_token: String::new(),
            media_base_url: "/media".to_string(),
            max_upload_bytes: 1024,
            db_pool_size: 2,
            cors_origins: Vec::new(),
            admin_email: String::new(),
            admin_password: String::new(),
            request_timeout_secs: 30,
        }
    }
}
