//! JWT Token Handler
//! Mission: Issue and verify the signed tokens that back a session

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

/// Sessions live for seven days from issuance.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// JWT handler for token operations.
///
/// The signing secret is injected once at startup and held immutably;
/// no code path reads it from the environment after construction.
pub struct JwtHandler {
    secret: String,
}

/// Why a token failed verification. Expiry is reported separately
/// because it produces a different user-facing message.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Malformed,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token expired"),
            TokenError::Malformed => write!(f, "Invalid token"),
        }
    }
}

impl std::error::Error for TokenError {}

impl JwtHandler {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Issue a token for a principal, expiring `TOKEN_TTL_DAYS` from now.
    pub fn issue(&self, principal_id: &Uuid) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::days(TOKEN_TTL_DAYS))
            .context("Invalid timestamp")?;

        let claims = Claims {
            sub: principal_id.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        debug!(
            "Issuing token for principal {}, expires in {}d",
            principal_id, TOKEN_TTL_DAYS
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign token")
    }

    /// Verify a token and extract its claims.
    ///
    /// An expired-but-otherwise-valid token reports `Expired`; any parse
    /// or signature failure reports `Malformed`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        // No leeway: a token is invalid from its expiry instant onward.
        let mut validation = Validation::default();
        validation.leeway = 0;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?;

        Ok(decoded.claims)
    }
}
