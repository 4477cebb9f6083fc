//! Password utilities

use argon2::Argon2;
use argon2::password_hash;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use uuid::Uuid;

/// Generate a new password
pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Hash a given password
///
/// The salt is taken from a random (v4) UUID
pub fn hash(password: &str) -> password_hash::Result<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())?;

    let hashed_password = Argon2::default().hash_password(password.as_bytes(), &salt)?;

    Ok(hashed_password.to_string())
}

/// Verify a given password against a given hash
///
/// A malformed hash never verifies
pub fn verify(hashed_password: &str, password: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hashed_password) else {
        tracing::warn!("Stored password hash could not be parsed");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed_password = hash("verysecret").unwrap();

        assert!(verify(&hashed_password, "verysecret"));
        assert!(!verify(&hashed_password, "notsecret"));
        assert!(!verify("not a hash", "verysecret"));
    }

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(generate(), generate());
    }
}
