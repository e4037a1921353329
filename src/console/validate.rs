//! Input validation
//!
//! Turns raw user text into values the store can take. The store trusts
//! these checks and only enforces id uniqueness itself.

use crate::error::{Result, StockError};

fn invalid(msg: impl Into<String>) -> StockError {
    StockError::Validation(msg.into())
}

/// Reject text the delimited format could not round-trip
fn check_single_field(what: &str, value: &str) -> Result<()> {
    if value.contains('|') || value.contains(['\n', '\r']) {
        return Err(invalid(format!("{} cannot contain '|' or line breaks", what)));
    }
    Ok(())
}

/// Trimmed, non-empty id
pub fn parse_id(input: &str) -> Result<String> {
    let id = input.trim();
    if id.is_empty() {
        return Err(invalid("ID cannot be empty"));
    }
    check_single_field("ID", id)?;
    Ok(id.to_string())
}

/// Trimmed name, may be empty
pub fn parse_name(input: &str) -> Result<String> {
    let name = input.trim();
    check_single_field("Name", name)?;
    Ok(name.to_string())
}

/// Non-negative integer
pub fn parse_quantity(input: &str) -> Result<u64> {
    let input = input.trim();
    match input.parse::<i128>() {
        Ok(n) if n < 0 => Err(invalid("Quantity must be 0 or greater")),
        Ok(n) => u64::try_from(n).map_err(|_| invalid("Quantity is too large")),
        Err(_) => Err(invalid(format!("Quantity must be a whole number, got '{}'", input))),
    }
}

/// Finite, non-negative number
pub fn parse_price(input: &str) -> Result<f64> {
    let input = input.trim();
    let price: f64 = input
        .parse()
        .map_err(|_| invalid(format!("Price must be a number, got '{}'", input)))?;
    if !price.is_finite() {
        return Err(invalid("Price must be a finite number"));
    }
    if price < 0.0 {
        return Err(invalid("Price must be 0 or greater"));
    }
    Ok(price)
}

/// Blank means "keep the current value"
pub fn parse_optional_quantity(input: &str) -> Result<Option<u64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_quantity(input).map(Some)
}

/// Blank means "keep the current value"
pub fn parse_optional_price(input: &str) -> Result<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_price(input).map(Some)
}
