//! Field rules for the login and signup forms.
//!
//! Every field is checked independently in one pass; within a field only the
//! first failing rule reports. These checks are advisory UI validation, not an
//! RFC 5322 parser.

use regex::Regex;

pub const EMAIL_REQUIRED: &str = "Email is required.";
pub const EMAIL_INVALID: &str = "Enter a valid email (example@domain.com).";
pub const PASSWORD_REQUIRED: &str = "Password is required.";
pub const CONFIRM_REQUIRED: &str = "Please confirm your password.";
pub const CONFIRM_MISMATCH: &str = "Passwords do not match.";

/// Logical form fields an error can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
}

/// A user-correctable problem with one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Normalize an email for lookup/uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check: one `@`, no whitespace, a dot in the domain.
pub fn is_valid_email(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").is_ok_and(|regex| regex.is_match(trimmed))
}

pub fn check_email(value: &str) -> Option<FieldError> {
    if value.trim().is_empty() {
        Some(FieldError::new(Field::Email, EMAIL_REQUIRED))
    } else if !is_valid_email(value) {
        Some(FieldError::new(Field::Email, EMAIL_INVALID))
    } else {
        None
    }
}

/// Password rules for a new account: required, then a minimum length.
pub fn check_new_password(value: &str, min_length: usize) -> Option<FieldError> {
    if value.is_empty() {
        Some(FieldError::new(Field::Password, PASSWORD_REQUIRED))
    } else if value.chars().count() < min_length {
        Some(FieldError::new(
            Field::Password,
            format!("Password must be at least {min_length} characters."),
        ))
    } else {
        None
    }
}

/// Login only checks presence; the stored value was length-checked at signup.
pub fn check_login_password(value: &str) -> Option<FieldError> {
    value
        .is_empty()
        .then(|| FieldError::new(Field::Password, PASSWORD_REQUIRED))
}

pub fn check_confirm_password(password: &str, confirm: &str) -> Option<FieldError> {
    if confirm.is_empty() {
        Some(FieldError::new(Field::ConfirmPassword, CONFIRM_REQUIRED))
    } else if password != confirm {
        Some(FieldError::new(Field::ConfirmPassword, CONFIRM_MISMATCH))
    } else {
        None
    }
}

/// Runs all signup rules; an empty result means the form is valid.
pub fn validate_signup(
    email: &str,
    password: &str,
    confirm: &str,
    min_password_length: usize,
) -> Vec<FieldError> {
    [
        check_email(email),
        check_new_password(password, min_password_length),
        check_confirm_password(password, confirm),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Runs all login rules; an empty result means the form is valid.
pub fn validate_login(email: &str, password: &str) -> Vec<FieldError> {
    [check_email(email), check_login_password(password)]
        .into_iter()
        .flatten()
        .collect()
}
