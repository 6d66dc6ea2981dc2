use crate::utils::error::{Result, SmokeError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 驗證端點 URL，限制允許的 scheme
pub fn validate_endpoint(field_name: &str, url_str: &str, allowed_schemes: &[&str]) -> Result<()> {
    if url_str.is_empty() {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => {
            let scheme = url.scheme();
            if allowed_schemes.contains(&scheme) {
                Ok(())
            } else {
                Err(SmokeError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: url_str.to_string(),
                    reason: format!(
                        "Unsupported URL scheme: {}. Allowed schemes: {}",
                        scheme,
                        allowed_schemes.join(", ")
                    ),
                })
            }
        }
        Err(e) => Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Index / database / collection names go straight into request paths,
/// so whitespace is rejected up front.
pub fn validate_identifier(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    if value.chars().any(char::is_whitespace) {
        return Err(SmokeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Identifier cannot contain whitespace".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint("search.url", "http://localhost:9200", &["http", "https"]).is_ok());
        assert!(validate_endpoint("search.url", "https://example.com", &["http", "https"]).is_ok());
        assert!(validate_endpoint("search.url", "", &["http", "https"]).is_err());
        assert!(validate_endpoint("search.url", "not-a-url", &["http", "https"]).is_err());
        assert!(validate_endpoint("search.url", "ftp://example.com", &["http", "https"]).is_err());
    }

    #[test]
    fn test_validate_endpoint_store_schemes() {
        assert!(validate_endpoint("keyvalue.url", "redis://localhost:6379", &["redis", "rediss"]).is_ok());
        assert!(validate_endpoint("keyvalue.url", "http://localhost:6379", &["redis", "rediss"]).is_err());
        assert!(validate_endpoint(
            "document.uri",
            "mongodb://localhost:27017",
            &["mongodb", "mongodb+srv"]
        )
        .is_ok());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("relational.pool_size", 4, 1).is_ok());
        assert!(validate_positive_number("relational.pool_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("search.index", "smoke_docs").is_ok());
        assert!(validate_identifier("search.index", "smoke docs").is_err());
        assert!(validate_identifier("search.index", "  ").is_err());
    }
}
