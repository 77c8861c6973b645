//! Form-field validation for the order and catalog boundaries.
//!
//! The patterns mirror what the storefront enforces on its forms: a customer
//! name of at least two Hangul/Latin letters or spaces, the domestic mobile
//! format 010-XXXX-XXXX, and a plain local@domain.tld email shape.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;
use crate::models::CATEGORIES;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[가-힣a-zA-Z\s]{2,}$").expect("name pattern"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^010-\d{4}-\d{4}$").expect("phone pattern"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Pull a required string field out of a JSON payload, rejecting absent or
/// blank values the way the storefront rejects empty form fields.
pub fn required_text(value: Option<&str>, field: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::validation(format!("{field} is required"))),
    }
}

pub fn validate_customer_name(name: &str) -> Result<(), AppError> {
    if !NAME_RE.is_match(name.trim()) {
        return Err(AppError::validation(
            "name must be at least 2 characters of Hangul or Latin letters",
        ));
    }
    Ok(())
}

pub fn validate_customer_phone(phone: &str) -> Result<(), AppError> {
    if !PHONE_RE.is_match(phone.trim()) {
        return Err(AppError::validation("phone must match 010-XXXX-XXXX"));
    }
    Ok(())
}

/// Email is optional everywhere it appears; only a present, non-empty value is checked.
pub fn validate_customer_email(email: Option<&str>) -> Result<(), AppError> {
    if let Some(email) = email.map(str::trim)
        && !email.is_empty()
        && !EMAIL_RE.is_match(email)
    {
        return Err(AppError::validation("email address is malformed"));
    }
    Ok(())
}

pub fn validate_category(category: &str) -> Result<(), AppError> {
    if !CATEGORIES.contains(&category) {
        return Err(AppError::validation(format!(
            "category must be one of: {}",
            CATEGORIES.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_price(price: i64) -> Result<(), AppError> {
    if price <= 0 {
        return Err(AppError::validation("price must be a positive amount"));
    }
    Ok(())
}

pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::validation("quantity must be at least 1"));
    }
    Ok(())
}

/// Strip every non-digit character, so 010-1234-5678 and 01012345678 compare equal.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}
