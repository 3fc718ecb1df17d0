use super::ApiError;

const MAX_ID_LENGTH: usize = 64;

/// Path identifiers are opaque strings (UUIDs for rows created here).
pub fn validate_id(id: &str) -> Result<&str, ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("ID cannot be empty"));
    }

    if trimmed.len() > MAX_ID_LENGTH {
        return Err(ApiError::validation(format!(
            "Invalid ID: must be {MAX_ID_LENGTH} characters or less"
        )));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::validation(
            "Invalid ID: only letters, digits, hyphens and underscores are allowed",
        ));
    }

    tracing::Span::current().record("entity_id", trimmed);
    Ok(trimmed)
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MAX_LIMIT: u64 = 1000;
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_LIMIT}"
        )));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert_eq!(
            validate_id("0b7e2c1a-6f0e-4a57-9c1e-2f7d8a9b0c1d").unwrap(),
            "0b7e2c1a-6f0e-4a57-9c1e-2f7d8a9b0c1d"
        );
        assert_eq!(validate_id(" abc ").unwrap(), "abc");
        assert!(validate_id("").is_err());
        assert!(validate_id("   ").is_err());
        assert!(validate_id("a".repeat(65).as_str()).is_err());
        assert!(validate_id("1;DROP TABLE").is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(1000).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(1001).is_err());
    }
}
