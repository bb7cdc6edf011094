//! Password strength rules applied at registration.
//!
//! Hashing lives with the web layer; this module only decides whether a
//! candidate password is acceptable.

/// Default minimum length when none is configured.
pub const DEFAULT_MIN_LENGTH: usize = 8;

/// Attributes shorter than this are not compared against the password.
const MIN_ATTRIBUTE_LENGTH: usize = 3;

/// A short list of passwords that are rejected outright.
const COMMON_PASSWORDS: &[&str] = &[
    "123456", "12345678", "123456789", "1234567890", "password", "password1",
    "qwerty", "qwerty123", "qwertyuiop", "abc123", "111111", "000000", "letmein",
    "welcome", "iloveyou", "admin", "admin123", "monkey", "dragon", "sunshine",
    "football", "baseball", "princess", "starwars", "trustno1", "passw0rd",
    "superman", "master", "shadow", "michael",
];

/// Validate that a password meets the strength requirements.
///
/// `user_attributes` are the username, names and email of the account; a
/// password that contains one of them (or is contained by one) is rejected.
/// Returns every violated rule, not just the first.
pub fn validate_password_strength(
    password: &str,
    min_length: usize,
    user_attributes: &[&str],
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if password.chars().count() < min_length {
        errors.push(format!(
            "Password must be at least {min_length} characters long"
        ));
    }

    let lowered = password.to_lowercase();

    if user_attributes
        .iter()
        .map(|attr| attr.trim().to_lowercase())
        .filter(|attr| attr.chars().count() >= MIN_ATTRIBUTE_LENGTH)
        .any(|attr| lowered.contains(&attr) || (!lowered.is_empty() && attr.contains(&lowered)))
    {
        errors.push("Password is too similar to your personal information".to_string());
    }

    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        errors.push("Password is too common".to_string());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("Password must not be entirely numeric".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
