//! Input validation for API requests.
//!
//! This module provides validation functions for API request data,
//! ensuring all inputs meet the required format and constraints.
//!
//! For collecting multiple validation errors and returning them as an ApiError,
//! use the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::Role;

lazy_static! {
    /// Regex for validating email addresses
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[^@\s]+@[^@\s]+\.[^@\s]+$"
    ).unwrap();

    /// Regex for validating phone numbers (E.164, optional leading +)
    static ref PHONE_REGEX: Regex = Regex::new(
        r"^\+?[1-9]\d{1,14}$"
    ).unwrap();
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().len() < 2 {
        return Err("Name must be at least 2 characters long".to_string());
    }

    if name.len() > 255 {
        return Err("Name is too long (max 255 characters)".to_string());
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 320 {
        return Err("Email is too long (max 320 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email.trim()) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a phone number (optional field)
pub fn validate_phone(phone: &Option<String>) -> Result<(), String> {
    if let Some(p) = phone {
        let trimmed = p.trim();
        if trimmed.is_empty() {
            return Ok(()); // Empty string treated as no phone
        }

        if !PHONE_REGEX.is_match(trimmed) {
            return Err("Invalid phone number format".to_string());
        }
    }

    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !has_uppercase {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !has_lowercase {
        return Err("Password must contain at least one lowercase letter".to_string());
    }
    if !has_digit {
        return Err("Password must contain at least one number".to_string());
    }
    if !has_special {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

/// Validate a role name and parse it
pub fn validate_role(role: &str) -> Result<Role, String> {
    role.parse::<Role>()
        .map_err(|_| "Invalid role specified".to_string())
}

/// Validate a path-supplied account id
pub fn validate_account_id(id: i64) -> Result<(), String> {
    if id < 1 {
        return Err("Admin ID must be a positive integer".to_string());
    }

    Ok(())
}
