//! Field validators shared by the record drafts.
//!
//! They plug into `#[validate(custom(function = ...))]` attributes.

use std::borrow::Cow;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::ValidationError;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Rejects empty or whitespace-only text.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "must not be blank"));
    }
    Ok(())
}

/// Accepts ISO 4217 codes such as `RUB` or `USD`.
pub(crate) fn currency_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != 3 || rusty_money::iso::find(code).is_none() {
        return Err(invalid("currency", "must be an ISO 4217 currency code"));
    }
    Ok(())
}

/// Accepts a calendar month written as `YYYY-MM`.
pub(crate) fn month(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
        && NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").is_ok();
    if !well_formed {
        return Err(invalid("month", "must be a month in YYYY-MM form"));
    }
    Ok(())
}

pub(crate) fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || value.is_zero() {
        return Err(invalid("positive", "must be greater than zero"));
    }
    Ok(())
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("non_negative", "must not be negative"));
    }
    Ok(())
}

/// Accepts values between 0 and 100 inclusive.
pub(crate) fn percentage(value: &Decimal) -> Result<(), ValidationError> {
    non_negative(value).map_err(|_| invalid("percentage", "must be between 0 and 100"))?;
    if *value > Decimal::ONE_HUNDRED {
        return Err(invalid("percentage", "must be between 0 and 100"));
    }
    Ok(())
}
