//! Field validation rules.
//!
//! Plain functions, one per rule. Request types wire them to fields with
//! `#[validate(custom(...))]` and callers run `validate()` explicitly.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

/// The only dialing prefix currently accepted.
pub const COUNTRY_CODE: &str = "+62";

/// Minimum full name length.
pub const MIN_FULL_NAME_LENGTH: u64 = 3;

/// Maximum full name length.
pub const MAX_FULL_NAME_LENGTH: u64 = 60;

/// Minimum phone number length, country code included.
pub const MIN_PHONE_LENGTH: u64 = 10;

/// Maximum phone number length, country code included.
pub const MAX_PHONE_LENGTH: u64 = 13;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: u64 = 6;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: u64 = 64;

static PHONE_WITH_COUNTRY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+62[0-9]+$").expect("valid phone regex"));

/// Check that a phone number is `+62` followed by one or more digits.
///
/// # Examples
///
/// ```
/// use profile_service::auth::validation::validate_phone_format;
///
/// assert!(validate_phone_format("+628123456789"));
/// assert!(!validate_phone_format("+658123456789"));
/// assert!(!validate_phone_format("+62"));
/// ```
pub fn validate_phone_format(value: &str) -> bool {
    PHONE_WITH_COUNTRY_CODE.is_match(value)
}

/// Check that a password has an uppercase letter, a digit and a special
/// character (anything that is neither a letter nor a digit).
///
/// Lowercase letters are not required. Length is checked separately.
///
/// # Examples
///
/// ```
/// use profile_service::auth::validation::validate_password_strength;
///
/// assert!(validate_password_strength("Aa1!aaaa"));
/// assert!(validate_password_strength("A1!"));
/// assert!(!validate_password_strength("alllowercase1"));
/// ```
pub fn validate_password_strength(value: &str) -> bool {
    let mut has_uppercase = false;
    let mut has_digit = false;
    let mut has_special = false;

    for c in value.chars() {
        if c.is_uppercase() {
            has_uppercase = true;
        } else if c.is_numeric() {
            has_digit = true;
        } else if !c.is_alphabetic() {
            has_special = true;
        }
    }

    has_uppercase && has_digit && has_special
}

/// Split a validated phone number into country code and local number.
///
/// Returns `None` when the number does not start with [`COUNTRY_CODE`].
pub fn split_phone_number(phone_with_prefix: &str) -> Option<(&str, &str)> {
    phone_with_prefix
        .strip_prefix(COUNTRY_CODE)
        .map(|local| (COUNTRY_CODE, local))
}

/// `validator` adapter for [`validate_phone_format`].
pub fn phone_with_country_code(value: &str) -> Result<(), ValidationError> {
    if validate_phone_format(value) {
        Ok(())
    } else {
        Err(ValidationError::new("phone_country_code")
            .with_message("phone_number must start with +62 followed by digits".into()))
    }
}

/// `validator` adapter for [`validate_password_strength`].
pub fn strong_password(value: &str) -> Result<(), ValidationError> {
    if validate_password_strength(value) {
        Ok(())
    } else {
        Err(ValidationError::new("strong_password").with_message(
            "password must contain an uppercase letter, a digit and a special character".into(),
        ))
    }
}

/// Flatten `validator` errors into field name -> messages.
pub fn field_messages(errors: &ValidationErrors) -> HashMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let messages = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value for {field}"))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
