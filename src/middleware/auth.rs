use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError};

/// A live admin session, decoded from the bearer token issued by the login
/// route. Every mutating route extracts this and calls [`ensure_admin`].
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub admin_id: Uuid,
    pub role: String,
}

pub fn ensure_admin(session: &AdminSession) -> Result<(), AppError> {
    if session.role != "admin" {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::validation("Missing Authorization header"))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::validation("Invalid Authorization header"))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::validation("Invalid Authorization scheme"));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::validation("Invalid or expired session token"))?;

        let admin_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::validation("Invalid admin id in token"))?;

        Ok(AdminSession {
            admin_id,
            role: decoded.claims.role.clone(),
        })
    }
}
