//! Local pre-checks for the registration form.
//!
//! The backend validates everything again; these exist so obviously bad input
//! fails without a round trip.

use std::ops::RangeInclusive;

use crate::models::{UserCreate, UserLogin};

pub const PASSWORD_LEN: RangeInclusive<usize> = 6..=72;
pub const AGE_RANGE: RangeInclusive<u16> = 18..=120;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("Password must be at least 6 characters long.")]
    PasswordTooShort,

    #[error("Password cannot be longer than 72 characters.")]
    PasswordTooLong,

    #[error("Age must be between 18 and 120 years.")]
    AgeOutOfRange,

    #[error("Please fill in the {0} field.")]
    MissingField(&'static str),
}

/// Password length in characters must fall within [`PASSWORD_LEN`].
///
/// # Errors
///
/// Returns [`ValidationError::PasswordTooShort`] or [`ValidationError::PasswordTooLong`].
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < *PASSWORD_LEN.start() {
        Err(ValidationError::PasswordTooShort)
    } else if len > *PASSWORD_LEN.end() {
        Err(ValidationError::PasswordTooLong)
    } else {
        Ok(())
    }
}

/// # Errors
///
/// Returns [`ValidationError::AgeOutOfRange`] outside [`AGE_RANGE`].
pub fn validate_age(age: u16) -> Result<(), ValidationError> {
    if AGE_RANGE.contains(&age) {
        Ok(())
    } else {
        Err(ValidationError::AgeOutOfRange)
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Checks run by the register form before calling the backend.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate_registration(payload: &UserCreate) -> Result<(), ValidationError> {
    require(&payload.name, "name")?;
    require(&payload.email, "email")?;
    require(&payload.password, "password")?;
    validate_password(&payload.password)?;
    validate_age(payload.age)
}

/// Login only checks that both fields were filled in.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`].
pub fn validate_login(credentials: &UserLogin) -> Result<(), ValidationError> {
    require(&credentials.email, "email")?;
    require(&credentials.password, "password")
}
