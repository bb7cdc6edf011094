//! Registration, login and profile forms.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{Validate, ValidateEmail, ValidationError};

use super::{collect, error, required, FieldErrors, FieldHint, Widget};
use crate::password_rules::validate_password_strength;

pub const MAX_USERNAME_LENGTH: usize = 150;

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
pub const INACTIVE_LOGIN: &str = "This account is inactive.";

const USERNAME_HELP: &str =
    "Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only.";

/// Usernames: 1-150 letters, digits or `@ . + - _`.
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(error("required", super::REQUIRED));
    }
    if value.chars().count() > MAX_USERNAME_LENGTH {
        return Err(error(
            "max_length",
            "Ensure this value has at most 150 characters.",
        ));
    }
    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(error(
            "invalid_username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

/// Email is optional; when present it must be a valid address.
fn optional_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.to_string().validate_email() {
        Ok(())
    } else {
        Err(error("email", "Enter a valid email address."))
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

const REGISTER_FIELDS: [FieldHint; 6] = [
    FieldHint::new("username", "Username", Widget::Text)
        .autofocus()
        .help(USERNAME_HELP),
    FieldHint::new("first_name", "First name", Widget::Text).optional(),
    FieldHint::new("last_name", "Last name", Widget::Text).optional(),
    FieldHint::new("email", "Email address", Widget::Email).optional(),
    FieldHint::new("password1", "Password", Widget::Password)
        .autocomplete("new-password")
        .help("Must not be too short, too common, entirely numeric, or similar to your personal information."),
    FieldHint::new("password2", "Password confirmation", Widget::Password)
        .autocomplete("new-password")
        .help("Enter the same password as before, for verification."),
];

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    #[validate(custom(function = "optional_email"))]
    pub email: String,
    #[validate(custom(function = "required"))]
    pub password1: String,
    #[validate(custom(function = "required"))]
    pub password2: String,
}

impl RegisterForm {
    pub fn hints() -> &'static [FieldHint] {
        &REGISTER_FIELDS
    }

    /// Trim text fields. Passwords are kept verbatim.
    pub fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
    }

    /// Field rules, password confirmation, then password strength.
    ///
    /// Username uniqueness needs the store and is checked by the caller.
    pub fn clean(&self, password_min_length: usize) -> Result<(), FieldErrors> {
        let mut errors = collect(self);

        if !self.password1.is_empty() && !self.password2.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", PASSWORD_MISMATCH);
            } else if let Err(messages) = validate_password_strength(
                &self.password2,
                password_min_length,
                &[&self.username, &self.first_name, &self.last_name, &self.email],
            ) {
                for message in messages {
                    errors.add("password2", message);
                }
            }
        }

        errors.into_result()
    }

    /// Values to echo back on re-render. Passwords are never echoed.
    pub fn values(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("username", self.username.clone()),
            ("first_name", self.first_name.clone()),
            ("last_name", self.last_name.clone()),
            ("email", self.email.clone()),
        ])
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

const LOGIN_FIELDS: [FieldHint; 2] = [
    FieldHint::new("username", "Username", Widget::Text).autofocus(),
    FieldHint::new("password", "Password", Widget::Password).autocomplete("current-password"),
];

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(custom(function = "required"))]
    pub username: String,
    #[validate(custom(function = "required"))]
    pub password: String,
}

impl LoginForm {
    pub fn hints() -> &'static [FieldHint] {
        &LOGIN_FIELDS
    }

    pub fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
    }

    pub fn clean(&self) -> Result<(), FieldErrors> {
        collect(self).into_result()
    }

    pub fn values(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([("username", self.username.clone())])
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

const PROFILE_FIELDS: [FieldHint; 4] = [
    FieldHint::new("username", "Username", Widget::Text).help(USERNAME_HELP),
    FieldHint::new("first_name", "First name", Widget::Text).optional(),
    FieldHint::new("last_name", "Last name", Widget::Text).optional(),
    FieldHint::new("email", "Email address", Widget::Email).optional(),
];

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileForm {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    #[validate(custom(function = "optional_email"))]
    pub email: String,
}

impl ProfileForm {
    pub fn hints() -> &'static [FieldHint] {
        &PROFILE_FIELDS
    }

    pub fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
    }

    pub fn clean(&self) -> Result<(), FieldErrors> {
        collect(self).into_result()
    }

    pub fn values(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("username", self.username.clone()),
            ("first_name", self.first_name.clone()),
            ("last_name", self.last_name.clone()),
            ("email", self.email.clone()),
        ])
    }
}
