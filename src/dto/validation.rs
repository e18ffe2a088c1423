//! Validation helpers for DTOs.

use validator::ValidationError;

/// Length of every participant code.
pub const PARTICIPANT_CODE_LENGTH: usize = 8;

/// Validates that a participant code is exactly 8 uppercase alphanumeric
/// characters. Callers are expected to normalize (trim + uppercase) first;
/// codes are matched case-insensitively at the API surface.
///
/// # Examples
///
/// ```ignore
/// validate_participant_code("AB12CD34") // Ok
/// validate_participant_code("ab12cd34") // Err - not normalized
/// validate_participant_code("AB12CD3")  // Err - too short
/// ```
pub fn validate_participant_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != PARTICIPANT_CODE_LENGTH {
        let mut err = ValidationError::new("participant_code_length");
        err.message = Some(
            format!(
                "participant code must be exactly {} characters (got {})",
                PARTICIPANT_CODE_LENGTH,
                code.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    {
        let mut err = ValidationError::new("participant_code_format");
        err.message =
            Some("participant code must contain only uppercase letters and digits".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_participant_code_valid() {
        assert!(validate_participant_code("AB12CD34").is_ok());
        assert!(validate_participant_code("00000000").is_ok());
        assert!(validate_participant_code("ZZZZZZZZ").is_ok());
    }

    #[test]
    fn test_validate_participant_code_invalid_length() {
        assert!(validate_participant_code("AB12CD3").is_err()); // too short
        assert!(validate_participant_code("AB12CD345").is_err()); // too long
        assert!(validate_participant_code("").is_err()); // empty
    }

    #[test]
    fn test_validate_participant_code_invalid_format() {
        assert!(validate_participant_code("ab12cd34").is_err()); // lowercase
        assert!(validate_participant_code("AB12CD3-").is_err()); // punctuation
        assert!(validate_participant_code("AB12 D34").is_err()); // space
    }
}
