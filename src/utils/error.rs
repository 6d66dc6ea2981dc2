use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("Search request failed: {0}")]
    SearchError(#[from] reqwest::Error),

    #[error("Document store error: {0}")]
    DocumentError(#[from] mongodb::error::Error),

    #[error("Relational store error: {0}")]
    RelationalError(#[from] tokio_postgres::Error),

    #[error("Relational pool error: {0}")]
    PoolError(#[from] deadpool_postgres::PoolError),

    #[error("Key-value store error: {0}")]
    KeyValueError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Unexpected response from {store}: {message}")]
    UnexpectedResponseError { store: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Store,
    Local,
}

impl SmokeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SmokeError::ConfigValidationError { .. }
            | SmokeError::InvalidConfigValueError { .. }
            | SmokeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SmokeError::SearchError(_)
            | SmokeError::DocumentError(_)
            | SmokeError::RelationalError(_)
            | SmokeError::PoolError(_)
            | SmokeError::KeyValueError(_)
            | SmokeError::UnexpectedResponseError { .. } => ErrorCategory::Store,
            SmokeError::SerializationError(_) | SmokeError::IoError(_) => ErrorCategory::Local,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Store => ErrorSeverity::High,
            ErrorCategory::Local => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SmokeError::SearchError(_) => {
                "Check that the search engine is reachable at the configured URL (default http://localhost:9200)".to_string()
            }
            SmokeError::DocumentError(_) => {
                "Check that the document database is reachable at the configured URI (default mongodb://localhost:27017)".to_string()
            }
            SmokeError::RelationalError(_) | SmokeError::PoolError(_) => {
                "Check the relational DSN, credentials, and that the target database exists".to_string()
            }
            SmokeError::KeyValueError(_) => {
                "Check that the key-value store is reachable at the configured URL (default redis://localhost:6379)".to_string()
            }
            SmokeError::ConfigValidationError { field, .. }
            | SmokeError::InvalidConfigValueError { field, .. }
            | SmokeError::MissingConfigError { field } => {
                format!("Fix the '{}' entry in the config file or the matching CLI flag", field)
            }
            SmokeError::UnexpectedResponseError { store, .. } => {
                format!("The {} store answered but not with the expected data; inspect the server state", store)
            }
            SmokeError::SerializationError(_) => {
                "The response body could not be decoded; rerun with --verbose to see the raw payload".to_string()
            }
            SmokeError::IoError(_) => "Check file permissions and paths".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Store => format!("Store operation failed: {}", self),
            ErrorCategory::Local => format!("Local error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SmokeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_critical() {
        let err = SmokeError::MissingConfigError {
            field: "search.url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("search.url"));
    }

    #[test]
    fn test_unexpected_response_is_store_error() {
        let err = SmokeError::UnexpectedResponseError {
            store: "document".to_string(),
            message: "document vanished after insert".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Store);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err
            .user_friendly_message()
            .starts_with("Store operation failed"));
    }
}
