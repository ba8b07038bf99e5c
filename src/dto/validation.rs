//! Validation helpers for DTOs.

use time::{Date, macros::format_description};
use validator::ValidationError;

/// Validates that an access code is 4 to 16 uppercase letters or digits.
///
/// # Examples
///
/// ```ignore
/// validate_access_code("K7Q2ZP") // Ok
/// validate_access_code("k7q2zp") // Err - lowercase
/// validate_access_code("K7Q")    // Err - too short
/// ```
pub fn validate_access_code(code: &str) -> Result<(), ValidationError> {
    if !(4..=16).contains(&code.len()) {
        let mut err = ValidationError::new("access_code_length");
        err.message = Some(
            format!(
                "Access code must be between 4 and 16 characters (got {})",
                code.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        let mut err = ValidationError::new("access_code_format");
        err.message = Some("Access code must contain only uppercase letters and digits".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a calendar date written as `YYYY-MM-DD`.
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, &format).map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("date_format");
        err.message = Some(format!("`{value}` is not a valid YYYY-MM-DD date").into());
        err
    })
}

/// Validates that a tee colour label is a short non-blank word.
pub fn validate_tee_color(color: &str) -> Result<(), ValidationError> {
    let trimmed = color.trim();
    if trimmed.is_empty() || trimmed.len() > 32 {
        let mut err = ValidationError::new("tee_color");
        err.message = Some("Tee color must be between 1 and 32 characters".into());
        return Err(err);
    }
    Ok(())
}
