// Configuration validation

use crate::{ConfigError, Result};

/// Implemented by typed configuration structs checked before use
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable field checks
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    pub fn not_zero(value: i64, field: &str) -> Result<()> {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be zero",
                field
            )));
        }
        Ok(())
    }

    /// Cookie names and similar HTTP tokens: no separators, whitespace or controls
    pub fn is_http_token(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;
        let invalid = value.chars().any(|c| {
            c.is_ascii_control()
                || c.is_whitespace()
                || !c.is_ascii()
                || "()<>@,;:\\\"/[]?={}".contains(c)
        });
        if invalid {
            return Err(ConfigError::ValidationError(format!(
                "{} contains characters not allowed in an HTTP token",
                field
            )));
        }
        Ok(())
    }

    pub fn starts_with(value: &str, prefix: &str, field: &str) -> Result<()> {
        if !value.starts_with(prefix) {
            return Err(ConfigError::ValidationError(format!(
                "{} must start with '{}'",
                field, prefix
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty("value", "field").is_ok());
        assert!(ConfigValidator::not_empty("", "field").is_err());
        assert!(ConfigValidator::not_empty("   ", "field").is_err());
    }

    #[test]
    fn test_not_zero_validation() {
        assert!(ConfigValidator::not_zero(-1, "max_age").is_ok());
        assert!(ConfigValidator::not_zero(0, "max_age").is_err());
    }

    #[test]
    fn test_http_token_validation() {
        assert!(ConfigValidator::is_http_token("XSRF-TOKEN", "cookie_name").is_ok());
        assert!(ConfigValidator::is_http_token("_csrf", "cookie_name").is_ok());
        assert!(ConfigValidator::is_http_token("bad name", "cookie_name").is_err());
        assert!(ConfigValidator::is_http_token("a=b", "cookie_name").is_err());
        assert!(ConfigValidator::is_http_token("", "cookie_name").is_err());
    }

    #[test]
    fn test_starts_with_validation() {
        assert!(ConfigValidator::starts_with("/app", "/", "path").is_ok());
        assert!(ConfigValidator::starts_with("app", "/", "path").is_err());
    }
}
