use crate::ConfigResult;

/// Trait for configuration validation
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

/// General validation utilities
pub struct ValidationUtils;

impl ValidationUtils {
    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field_name: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    /// Validate that a timeout is reasonable
    pub fn validate_timeout_seconds(timeout_seconds: u64, field_name: &str) -> ConfigResult<()> {
        if timeout_seconds == 0 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be greater than 0"
            )));
        }
        if timeout_seconds > 3600 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be less than or equal to 3600"
            )));
        }
        Ok(())
    }

    /// Validate that a count is within `1..=max`
    pub fn validate_count(count: usize, field_name: &str, max: usize) -> ConfigResult<()> {
        if count == 0 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be greater than 0"
            )));
        }
        if count > max {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be less than or equal to {max}"
            )));
        }
        Ok(())
    }

    /// Validate that a URL parses and uses http or https
    pub fn validate_http_url(value: &str, field_name: &str) -> ConfigResult<()> {
        Self::validate_not_empty(value, field_name)?;

        let parsed = url::Url::parse(value).map_err(|e| {
            crate::ConfigError::Validation(format!("{field_name} is not a valid URL: {e}"))
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(crate::ConfigError::Validation(format!(
                "{field_name} must use http or https, got {other}"
            ))),
        }
    }

    /// Validate a `host:port` socket address
    pub fn validate_socket_address(value: &str, field_name: &str) -> ConfigResult<()> {
        value
            .parse::<std::net::SocketAddr>()
            .map(|_| ())
            .map_err(|e| {
                crate::ConfigError::Validation(format!(
                    "{field_name} is not a valid socket address: {e}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_empty() {
        assert!(ValidationUtils::validate_not_empty("test", "field").is_ok());
        assert!(ValidationUtils::validate_not_empty("  test  ", "field").is_ok());
        assert!(ValidationUtils::validate_not_empty("", "field").is_err());
        assert!(ValidationUtils::validate_not_empty("   ", "field").is_err());
    }

    #[test]
    fn test_validate_timeout_seconds() {
        assert!(ValidationUtils::validate_timeout_seconds(30, "t").is_ok());
        assert!(ValidationUtils::validate_timeout_seconds(3600, "t").is_ok());
        assert!(ValidationUtils::validate_timeout_seconds(0, "t").is_err());
        assert!(ValidationUtils::validate_timeout_seconds(3601, "t").is_err());
    }

    #[test]
    fn test_validate_count() {
        assert!(ValidationUtils::validate_count(10, "test", 100).is_ok());
        assert!(ValidationUtils::validate_count(100, "test", 100).is_ok());
        assert!(ValidationUtils::validate_count(0, "test", 100).is_err());
        assert!(ValidationUtils::validate_count(101, "test", 100).is_err());
    }

    #[test]
    fn test_validate_http_url() {
        assert!(ValidationUtils::validate_http_url("http://localhost:8080", "url").is_ok());
        assert!(ValidationUtils::validate_http_url("https://glue.example.com/api", "url").is_ok());
        assert!(ValidationUtils::validate_http_url("", "url").is_err());
        assert!(ValidationUtils::validate_http_url("localhost:8080", "url").is_err());
        assert!(ValidationUtils::validate_http_url("amqp://localhost:5672", "url").is_err());
    }

    #[test]
    fn test_validate_socket_address() {
        assert!(ValidationUtils::validate_socket_address("0.0.0.0:9090", "addr").is_ok());
        assert!(ValidationUtils::validate_socket_address("localhost", "addr").is_err());
    }
}
