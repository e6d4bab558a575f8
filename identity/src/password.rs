//! Argon2id password hashing and a minimal registration policy check.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(plain: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Password policy: at least 8 characters, at least one letter, at least one digit.
pub fn meets_policy(plain: &str) -> bool {
    plain.len() >= 8
        && plain.chars().any(|c| c.is_ascii_alphabetic())
        && plain.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_and_verifies_round_trip() {
        let hash = hash_password("Password1").unwrap();
        assert!(verify_password("Password1", &hash));
        assert!(!verify_password("WrongPass1", &hash));
    }

    #[test]
    fn policy_requires_letter_and_digit() {
        assert!(meets_policy("Password1"));
        assert!(!meets_policy("alllettersnope"));
        assert!(!meets_policy("12345678"));
        assert!(!meets_policy("short1"));
    }
}
