//! # Authentication Module
//!
//! Bearer-token authentication for the CareBook API. Tokens are HS256 JWTs
//! issued by the session service; their claims identify the calling user,
//! their role and, where the role has one, their doctor or patient profile.
//!
//! Handlers take an [`Authenticated`] argument to require a valid token.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use carebook_core::{
    errors::{ClinicError, ClinicResult},
    models::auth::{Caller, Role},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// JWT claims understood by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user id
    pub sub: Uuid,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Caller {
            user_id: claims.sub,
            role: claims.role,
            doctor_id: claims.doctor_id,
            patient_id: claims.patient_id,
        }
    }
}

/// Verifies bearer tokens against the shared secret
#[derive(Clone)]
pub struct JwtAuth {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Decodes and validates a token, returning the caller it identifies
    ///
    /// Expired, malformed or wrongly-signed tokens are rejected with
    /// `ClinicError::Authentication`.
    pub fn verify(&self, token: &str) -> ClinicResult<Caller> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            ClinicError::Authentication("Invalid or expired token".to_string())
        })?;

        Ok(data.claims.into())
    }
}

/// Signs a token for `caller` that expires after `ttl`
///
/// The API never issues tokens itself; this exists for tooling and tests.
pub fn issue_token(secret: &str, caller: &Caller, ttl: Duration) -> ClinicResult<String> {
    let claims = Claims {
        sub: caller.user_id,
        role: caller.role,
        doctor_id: caller.doctor_id,
        patient_id: caller.patient_id,
        exp: (Utc::now() + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ClinicError::Internal(Box::new(e)))
}

/// Extractor for the authenticated caller of a request
pub struct Authenticated(pub Caller);

#[axum::async_trait]
impl FromRequestParts<Arc<ApiState>> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ClinicError::Authentication("Missing authorization header".to_string()))?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ClinicError::Authentication("Invalid authorization header format".to_string())
            })?;

        let caller = state.auth.verify(token.trim())?;
        Ok(Authenticated(caller))
    }
}
