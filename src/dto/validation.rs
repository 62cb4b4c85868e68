//! Validation helpers for DTOs.

use validator::ValidationError;

/// Rejects strings that are empty or only whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Rejects teammate roll numbers that are present but blank.
///
/// Solo entries omit the field entirely rather than sending an empty string.
pub fn validate_teammate(value: &str) -> Result<(), ValidationError> {
    validate_not_blank(value).map_err(|mut err| {
        err.message = Some("teammate roll number must be omitted for solo entries".into());
        err
    })
}
