//! Validation helpers for point grants.

use validator::ValidationError;

/// Longest display name accepted for a grant.
pub const MAX_GRANT_NAME_LENGTH: usize = 64;

/// Validates that a grant name is not blank and fits on a single short line.
///
/// # Examples
///
/// ```ignore
/// validate_grant_name("Victory")  // Ok
/// validate_grant_name("   ")      // Err - blank
/// validate_grant_name("a\nb")     // Err - multi-line
/// ```
pub fn validate_grant_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("grant_name_blank");
        err.message = Some("Grant name must not be empty".into());
        return Err(err);
    }

    if name.chars().count() > MAX_GRANT_NAME_LENGTH {
        let mut err = ValidationError::new("grant_name_length");
        err.message = Some(
            format!(
                "Grant name must be at most {MAX_GRANT_NAME_LENGTH} characters (got {})",
                name.chars().count()
            )
            .into(),
        );
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("grant_name_format");
        err.message = Some("Grant name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
