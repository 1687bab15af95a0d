//! Password hashing with Argon2
//!
//! New hashes are Argon2 PHC strings. Bcrypt hashes (`$2a$`, `$2b$`, `$2y$`)
//! written by the previous backend are still accepted for verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::warn;

/// Prefixes of the modular-crypt bcrypt variants
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

fn is_bcrypt_hash(hash: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix))
}

/// Hash password using Argon2 and return the PHC string
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// Verify password against a stored Argon2 or bcrypt hash
///
/// An unparsable stored hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if is_bcrypt_hash(hash) {
        return match bcrypt::verify(password, hash) {
            Ok(matched) => matched,
            Err(e) => {
                warn!("Stored bcrypt hash is malformed: {}", e);
                false
            }
        };
    }

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password hash is not a valid PHC string: {}", e);
            return false;
        }
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
        let hash = hash_password("secret").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        assert!(!verify_password("secret", "plaintext-secret"));
        assert!(!verify_password("", ""));
        assert!(!verify_password("secret", "$2a$10$truncated"));
    }

    #[test]
    fn test_bcrypt_reference_hash() {
        // crypt_blowfish reference vector
        let hash = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

        assert!(verify_password("U*U", hash));
        assert!(!verify_password("U*U*", hash));
    }

    #[test]
    fn test_bcrypt_variants_verify() {
        let hash = bcrypt::hash("secret", 4).unwrap();
        let cost_and_salt = &hash[3..];

        for prefix in ["$2a", "$2b", "$2y"] {
            let variant = format!("{}{}", prefix, cost_and_salt);
            assert!(verify_password("secret", &variant), "{} should verify", prefix);
            assert!(!verify_password("wrong", &variant));
        }
    }

    #[test]
    fn test_new_hashes_stay_argon2() {
        let hash = hash_password("secret").unwrap();
        assert!(!is_bcrypt_hash(&hash));
    }
}
