//! Bearer token authentication and role gates.
//!
//! Login issues an HS256 JWT carrying the user's role and, for portal
//! accounts, their admission number. Handlers take [`AuthUser`] to require
//! a valid token and call [`AuthUser::require`] with one of the fixed role
//! allow-lists below.

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::PortalConfig;
use crate::error::ApiError;
use crate::models::user::User;
use crate::routes::PortalState;

pub const ROLE_SUPER_ADMIN: &str = "super_admin";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_STUDENT: &str = "student";
pub const ROLE_PARENT: &str = "parent";

pub const ALL_ROLES: &[&str] = &[ROLE_SUPER_ADMIN, ROLE_ADMIN, ROLE_STAFF, ROLE_STUDENT, ROLE_PARENT];
/// Back-office administration (users, admissions, fees, subscribers).
pub const ADMIN_ROLES: &[&str] = &[ROLE_SUPER_ADMIN, ROLE_ADMIN];
/// Content editing (careers, gallery, guidance, results, marketing pages).
pub const EDITOR_ROLES: &[&str] = &[ROLE_SUPER_ADMIN, ROLE_ADMIN, ROLE_STAFF];
/// Student/parent portal accounts.
pub const PORTAL_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_PARENT];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_number: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Sign a token for `user`.
pub fn issue_token(config: &PortalConfig, user: &User) -> anyhow::Result<IssuedToken> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.clone(),
        admission_number: user.admission_number.clone(),
        iat: now,
        exp: now + config.token_ttl_secs,
    };
    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("JWT encode failed: {e}"))?;

    Ok(IssuedToken {
        access_token,
        token_type: "Bearer",
        expires_in: config.token_ttl_secs,
    })
}

/// Decode and validate a token. Expiry is checked with no leeway.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    validation.validate_exp = true;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ApiError::Unauthorized("token has expired".to_string())
            }
            _ => ApiError::Unauthorized("invalid token".to_string()),
        })
}

/// Hash a plain password with argon2id.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::{PasswordHasher, SaltString};
    use argon2::Argon2;

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))
}

/// Verify a password against an argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use argon2::Argon2;

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.0.sub
    }

    pub fn role(&self) -> &str {
        &self.0.role
    }

    pub fn has_role(&self, allowed: &[&str]) -> bool {
        allowed.contains(&self.0.role.as_str())
    }

    /// 403 unless the caller's role is in `allowed`.
    pub fn require(&self, allowed: &[&str]) -> Result<(), ApiError> {
        if self.has_role(allowed) {
            Ok(())
        } else {
            tracing::debug!(user_id = self.0.sub, role = %self.0.role, "role not permitted");
            Err(ApiError::Forbidden(
                "you do not have permission to perform this action".to_string(),
            ))
        }
    }

    /// Editors may read any student's records; portal users only their own.
    pub fn require_student_access(&self, admission_number: &str) -> Result<(), ApiError> {
        if self.has_role(EDITOR_ROLES) {
            return Ok(());
        }
        if self.has_role(PORTAL_ROLES)
            && self.0.admission_number.as_deref() == Some(admission_number)
        {
            return Ok(());
        }
        Err(ApiError::Forbidden(
            "you may only view your own records".to_string(),
        ))
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    PortalState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = PortalState::from_ref(state);
        let token = extract_bearer(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_string()))?;
        let claims = verify_token(&state.config.jwt_secret, token)?;
        Ok(AuthUser(claims))
    }
}

/// `Option<AuthUser>`: no header means anonymous, a bad token is still 401.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    PortalState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let state = PortalState::from_ref(state);
        match extract_bearer(&parts.headers) {
            Some(token) => verify_token(&state.config.jwt_secret, token).map(|claims| Some(AuthUser(claims))),
            None => Ok(None),
        }
    }
}
