use crate::error::Error;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn new_hash(password: &str) -> Result<String, Error> {
    hash_password(password)
}

fn hash_password(password: &str) -> Result<String, Error> {
    let saltstring = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &saltstring)
        .map_err(|e| Error::PasswordHasherError(e.to_string()))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash_str: &str) -> Result<(), Error> {
    let hash =
        PasswordHash::new(hash_str).map_err(|e| Error::PasswordHasherError(e.to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .map_err(|_| Error::InvalidPassword)
}

/// Reject passwords that are too short or don't mix upper case, lower case, and digits.
pub fn check_password_strength(password: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::WeakPassword(
            "Password must be at least 8 characters long",
        ));
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(Error::WeakPassword(
            "Password must contain an uppercase letter",
        ));
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(Error::WeakPassword("Password must contain a lowercase letter"));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(Error::WeakPassword("Password must contain a digit"));
    }

    Ok(())
}

#[cfg(test)]
mod strength_tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_mixed_password() {
        check_password_strength("Sunrise2024").unwrap();
    }

    #[test]
    fn rejects_weak_passwords() {
        for weak in ["Ab1", "alllower1", "ALLUPPER1", "NoDigitsHere"] {
            assert_matches!(
                check_password_strength(weak),
                Err(Error::WeakPassword(_)),
                "{weak} should be rejected"
            );
        }
    }
}

#[cfg(all(test, any(feature = "test_slow", feature = "test_password")))]
mod tests {
    use super::*;
    use crate::error::Result;

    #[test]
    fn good_password() -> Result<()> {
        let hash = new_hash("abcdef")?;
        verify_password("abcdef", &hash)
    }

    #[test]
    fn bad_password() -> Result<()> {
        let hash = new_hash("abcdef")?;
        verify_password("abcdefg", &hash).expect_err("non-matching password");
        Ok(())
    }

    #[test]
    fn unique_password_salt() {
        let p1 = new_hash("abc").unwrap();
        let p2 = new_hash("abc").unwrap();
        assert_ne!(p1, p2);
    }
}
