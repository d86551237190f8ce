//! Admin password hashing and verification.
//!
//! Two static shared-secret roles: everyone can read, the admin can
//! mutate. Gating happens in the core operations via an explicit
//! `is_admin` flag; this module only owns the password digest.

use crate::models::{Club, ClubError};
use sha2::{Digest, Sha256};

/// Default admin password, hashed on first run. Change it in production.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Minimum length for a new admin password.
const MIN_PASSWORD_LEN: usize = 6;

/// SHA-256 hex digest of a password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password attempt against the club's stored digest.
pub fn verify_password(club: &Club, password: &str) -> bool {
    hash_password(password) == club.admin_password_hash
}

/// Change the admin password: the current one must verify and the new one
/// must be at least 6 characters. Confirm-field matching is a UI concern.
pub fn change_password(club: &mut Club, current: &str, new: &str) -> Result<(), ClubError> {
    if !verify_password(club, current) {
        return Err(ClubError::IncorrectPassword);
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClubError::PasswordTooShort);
    }
    club.admin_password_hash = hash_password(new);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_password_verifies() {
        let club = Club::new();
        assert!(verify_password(&club, DEFAULT_ADMIN_PASSWORD));
        assert!(!verify_password(&club, "letmein"));
    }

    #[test]
    fn hash_is_sha256_hex() {
        // sha256("admin123")
        assert_eq!(
            hash_password("admin123"),
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
        );
    }

    #[test]
    fn change_password_rules() {
        let mut club = Club::new();
        assert_eq!(
            change_password(&mut club, "wrong", "newpassword"),
            Err(ClubError::IncorrectPassword)
        );
        assert_eq!(
            change_password(&mut club, DEFAULT_ADMIN_PASSWORD, "short"),
            Err(ClubError::PasswordTooShort)
        );
        change_password(&mut club, DEFAULT_ADMIN_PASSWORD, "racquet42").unwrap();
        assert!(verify_password(&club, "racquet42"));
        assert!(!verify_password(&club, DEFAULT_ADMIN_PASSWORD));
    }
}
