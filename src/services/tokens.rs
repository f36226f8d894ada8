//! Session token issuing and verification (HS256 JWT)

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

/// JWT claims; `id` is the user id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: i32,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expiration_hours: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration_hours: config.jwt_expiration_hours,
        }
    }

    /// Sign a token for the given user
    pub fn issue(&self, user_id: i32) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            id: user_id,
            iat: now,
            exp: now + (self.expiration_hours as i64 * 3600),
        };
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &TokenClaims) -> AppResult<String> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Check signature and expiry
    pub fn verify(&self, token: &str) -> AppResult<TokenClaims> {
        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            AppError::unauthenticated()
        })
    }
}
