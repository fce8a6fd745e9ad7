//! Input validation helpers
//!
//! Centralized length/bound constants and validation functions used by the
//! CRUD handlers and order intake. SQLite TEXT has no built-in length
//! enforcement, so limits are applied here.

use rust_decimal::Decimal;

use crate::error::AppError;
use crate::money;

// ── Bounds ──────────────────────────────────────────────────────────

/// Minimum length for entity names (menu items, categories)
pub const MIN_NAME_LEN: usize = 2;

/// Maximum length for entity names
pub const MAX_NAME_LEN: usize = 100;

/// Descriptions and other free text
pub const MAX_TEXT_LEN: usize = 500;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Opaque identifiers (uuid strings and the like)
pub const MAX_ID_LEN: usize = 64;

/// Maximum quantity per line item
pub const MAX_QUANTITY: i64 = 9999;

/// Maximum price per item: 1,000,000.00 in cents
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

// ── Helpers ─────────────────────────────────────────────────────────

/// Validate an entity name: non-blank, within `MIN_NAME_LEN..=MAX_NAME_LEN`.
pub fn validate_name(value: &str, field: &str) -> Result<(), AppError> {
    let len = value.trim().chars().count();
    if len < MIN_NAME_LEN || len > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{field} must be between {MIN_NAME_LEN} and {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a price and convert it to cents: strictly positive, at most
/// two fractional digits of significance, capped at `MAX_PRICE_CENTS`.
pub fn validate_price(value: Decimal, field: &str) -> Result<i64, AppError> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation(format!("{field} must be positive")));
    }
    let cents = money::to_cents(value)
        .ok_or_else(|| AppError::validation(format!("{field} is out of range")))?;
    if cents > MAX_PRICE_CENTS {
        return Err(AppError::validation(format!(
            "{field} exceeds the maximum allowed price"
        )));
    }
    if cents == 0 {
        // Positive but below one cent rounds down to zero
        return Err(AppError::validation(format!("{field} must be at least 0.01")));
    }
    Ok(cents)
}

/// Validate a quantity: `1..=MAX_QUANTITY`
pub fn validate_quantity(quantity: i64, field: &str) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::validation(format!(
            "{field} must be at least 1, got {quantity}"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}
