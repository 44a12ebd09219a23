use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoauthorError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parsing,
    Storage,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CoauthorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoauthorError::ApiError(_) => ErrorCategory::Network,
            CoauthorError::XmlError(_)
            | CoauthorError::CsvError(_)
            | CoauthorError::SerializationError(_) => ErrorCategory::Parsing,
            CoauthorError::IoError(_) => ErrorCategory::Storage,
            CoauthorError::ConfigError { .. }
            | CoauthorError::ConfigValidationError { .. }
            | CoauthorError::InvalidConfigValueError { .. }
            | CoauthorError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CoauthorError::ProcessingError { .. } | CoauthorError::ValidationError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤可以重跑
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parsing | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check network connectivity and the --base-url value, then run again"
            }
            ErrorCategory::Parsing => {
                "The bibliography service returned an unexpected document; verify the base URL points at a DBLP mirror"
            }
            ErrorCategory::Storage => "Make sure the output directory exists and is writable",
            ErrorCategory::Configuration => {
                "Review the configuration file or command line flags (use --help)"
            }
            ErrorCategory::Processing => "Re-run with --verbose to inspect the traversal",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CoauthorError::ApiError(e) => format!("無法連線到書目服務: {}", e),
            CoauthorError::IoError(e) => format!("檔案讀寫失敗: {}", e),
            CoauthorError::MissingConfigError { field } => {
                format!("缺少必要設定: {}", field)
            }
            CoauthorError::InvalidConfigValueError { field, reason, .. } => {
                format!("設定 {} 無效: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoauthorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_high_severity() {
        let err = CoauthorError::MissingConfigError {
            field: "seeds.authors".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("seeds.authors"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err: CoauthorError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
