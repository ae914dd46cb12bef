//! JWT token encoding and decoding using HS256.
//!
//! The token carries the account id, role, and pseudonym id; handlers use the
//! pseudonym id for graph lookups so real identities never leave Postgres.

use crate::identity::models::Role;
use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — account UUID
    pub sub: String,
    /// Account email
    pub email: String,
    /// Account role (player / coach / admin)
    pub role: Role,
    /// Pseudonym id of the matching graph node
    pub pseudonym_id: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Encode a JWT token for the given account.
///
/// Uses HS256 signing with the provided secret.
pub fn encode_jwt(
    account_id: Uuid,
    email: &str,
    role: Role,
    pseudonym_id: &str,
    secret: &str,
    expiry_secs: u64,
) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: account_id.to_string(),
        email: email.to_string(),
        role,
        pseudonym_id: pseudonym_id.to_string(),
        iat: now,
        exp: now + expiry_secs as i64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT")
}

/// Decode and validate a JWT token.
///
/// Returns the claims if the token is valid, not expired, and
/// signed with the correct secret.
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data: TokenData<Claims> = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT")?;

    Ok(token_data.claims)
}

// ============================================================================
// Tests
// ============================================================================
