//! RS256 access/refresh token issuance and verification.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::models::{AccessClaims, RefreshClaims};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtCodec {
    pub fn from_pem_files(private_key_path: &str, public_key_path: &str) -> anyhow::Result<Self> {
        let private_pem = std::fs::read(private_key_path).map_err(|e| {
            anyhow::anyhow!("failed to read JWT private key at {private_key_path}: {e}")
        })?;
        let public_pem = std::fs::read(public_key_path).map_err(|e| {
            anyhow::anyhow!("failed to read JWT public key at {public_key_path}: {e}")
        })?;
        Ok(Self {
            encoding_key: EncodingKey::from_rsa_pem(&private_pem)?,
            decoding_key: DecodingKey::from_rsa_pem(&public_pem)?,
        })
    }

    /// For a verifier-only process (e.g. the gateway) that never signs tokens.
    pub fn verifier_from_pem_file(public_key_path: &str) -> anyhow::Result<DecodingKey> {
        let public_pem = std::fs::read(public_key_path).map_err(|e| {
            anyhow::anyhow!("failed to read JWT public key at {public_key_path}: {e}")
        })?;
        Ok(DecodingKey::from_rsa_pem(&public_pem)?)
    }

    pub fn issue_access(
        &self,
        user_id: Uuid,
        email: &str,
        role: &str,
        ttl_seconds: i64,
    ) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            user_id,
            email: email.to_string(),
            role: role.to_string(),
            token_type: "access".to_string(),
            iat: now,
            exp: now + ttl_seconds,
        };
        Ok(encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    pub fn issue_refresh(
        &self,
        user_id: Uuid,
        token_id: Uuid,
        ttl_seconds: i64,
    ) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            user_id,
            token_id,
            token_type: "refresh".to_string(),
            iat: now,
            exp: now + ttl_seconds,
        };
        Ok(encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    pub fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode_with_key::<AccessClaims>(token, &self.decoding_key)
    }

    pub fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        decode_with_key::<RefreshClaims>(token, &self.decoding_key)
    }
}

pub fn decode_with_key<T: serde::de::DeserializeOwned>(
    token: &str,
    key: &DecodingKey,
) -> Result<T, TokenError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = true;
    decode::<T>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
}

pub fn hash_refresh_token(raw: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(raw.as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
