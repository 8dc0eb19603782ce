//! Sign-up, sign-in and password-reset form checks.

use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{AuthError, CredentialField};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static PASSWORD_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z\d@$!%*#?&]{8,}$").expect("password pattern is valid")
});

fn invalid(field: CredentialField, message: &str) -> AuthError {
    AuthError::InvalidInput {
        field,
        message: message.to_string(),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// At least 8 characters from the allowed set, with a letter and a digit.
pub fn is_valid_password(password: &str) -> bool {
    PASSWORD_CHARS.is_match(password)
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Checks run in order; the first failure wins.
pub fn validate_sign_up(
    email: &str,
    password: &SecretString,
    confirm_password: &SecretString,
) -> Result<(), AuthError> {
    let password = password.expose_secret();
    let confirm_password = confirm_password.expose_secret();

    if email.is_empty() || password.is_empty() || confirm_password.is_empty() {
        return Err(invalid(CredentialField::General, "Please fill in all fields"));
    }
    if !is_valid_email(email) {
        return Err(invalid(CredentialField::Email, "Please enter a valid email address"));
    }
    if !is_valid_password(password) {
        return Err(invalid(
            CredentialField::Password,
            "Password must be at least 8 characters long and contain at least one letter and one number",
        ));
    }
    if password != confirm_password {
        return Err(invalid(CredentialField::ConfirmPassword, "Passwords do not match"));
    }
    Ok(())
}

pub fn validate_sign_in(email: &str, password: &SecretString) -> Result<(), AuthError> {
    if email.is_empty() || password.expose_secret().is_empty() {
        return Err(invalid(CredentialField::General, "Please fill in all fields"));
    }
    Ok(())
}

pub fn validate_reset_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(invalid(CredentialField::Email, "Please enter your email address"));
    }
    Ok(())
}
