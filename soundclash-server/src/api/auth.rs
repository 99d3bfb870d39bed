//! Admin authentication
//!
//! Password login issues an HS256 bearer token valid for 7 days; a
//! middleware layer guards every admin route except login itself.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use soundclash_common::{Error, Result};

use crate::api::ApiError;
use crate::AppState;

/// Login lasts 7 days
const TOKEN_VALIDITY_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    role: String,
    iat: i64,
    exp: i64,
}

/// Password check and token signing, shared via `AppState`.
#[derive(Clone)]
pub struct AdminAuth {
    admin_password: Arc<str>,
    signing_secret: Arc<str>,
}

impl AdminAuth {
    pub fn new(admin_password: &str, signing_secret: &str) -> Self {
        Self {
            admin_password: admin_password.into(),
            signing_secret: signing_secret.into(),
        }
    }

    /// Validate the admin password and issue a bearer token.
    pub fn login(&self, password: &str) -> Result<String> {
        if password != self.admin_password.as_ref() {
            return Err(Error::Unauthorized("incorrect password".to_string()));
        }

        let now = Utc::now();
        let claims = Claims {
            role: "admin".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.signing_secret.as_bytes()),
        )
        .map_err(|e| Error::Internal(format!("token signing failed: {e}")))
    }

    /// Validate a bearer token (signature, expiry, admin role).
    pub fn verify(&self, token: &str) -> Result<()> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.signing_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| Error::Unauthorized(format!("invalid token: {e}")))?;

        if data.claims.role != "admin" {
            return Err(Error::Unauthorized("invalid role".to_string()));
        }

        Ok(())
    }
}

/// Middleware guarding the admin routes.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::Unauthorized("missing bearer token".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("malformed authorization header".to_string()))?;

    state.auth.verify(token)?;

    Ok(next.run(request).await)
}
