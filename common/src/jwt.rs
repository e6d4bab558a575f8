//! Verify-only RS256 access token handling for processes that check tokens
//! but never issue them — currently just the Gateway. Identity keeps its own
//! `jwt` module for issuance since it alone holds the private half of the
//! key pair; this module exists so the Gateway doesn't have to depend on the
//! Identity binary crate to borrow one struct and a `decode` call.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::UserContext;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

pub fn load_public_key(path: &str) -> anyhow::Result<DecodingKey> {
    let pem = std::fs::read(path).map_err(|e| anyhow::anyhow!("failed to read JWT public key at {path}: {e}"))?;
    Ok(DecodingKey::from_rsa_pem(&pem)?)
}

/// Decodes and validates an access token's signature and expiry, then
/// rejects anything that isn't a `token_type: "access"` claim set.
pub fn verify_access_token(key: &DecodingKey, token: &str) -> Result<AccessClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = true;
    let claims = decode::<AccessClaims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

    if claims.token_type != "access" {
        return Err(TokenError::Invalid);
    }
    Ok(claims)
}

impl From<AccessClaims> for UserContext {
    fn from(claims: AccessClaims) -> Self {
        UserContext {
            user_id: claims.user_id,
            role: claims.role,
            email: Some(claims.email),
        }
    }
}
