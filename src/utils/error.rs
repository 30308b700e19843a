use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Content API returned {status}: {message}")]
    ContentApiError { status: u16, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Operation cancelled before completion")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl JournalError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            JournalError::ApiError(_) | JournalError::ContentApiError { .. } => {
                ErrorCategory::Network
            }
            JournalError::ConfigValidationError { .. }
            | JournalError::InvalidConfigValueError { .. }
            | JournalError::MissingConfigError { .. } => ErrorCategory::Configuration,
            JournalError::CsvError(_)
            | JournalError::SerializationError(_)
            | JournalError::ProcessingError { .. } => ErrorCategory::Data,
            JournalError::ZipError(_) | JournalError::IoError(_) | JournalError::Cancelled => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 使用者主動中斷，不算失敗
            JournalError::Cancelled => ErrorSeverity::Low,
            JournalError::ApiError(_) | JournalError::ContentApiError { .. } => {
                ErrorSeverity::Medium
            }
            JournalError::ConfigValidationError { .. }
            | JournalError::InvalidConfigValueError { .. }
            | JournalError::MissingConfigError { .. }
            | JournalError::CsvError(_)
            | JournalError::SerializationError(_)
            | JournalError::ProcessingError { .. } => ErrorSeverity::High,
            JournalError::ZipError(_) | JournalError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            JournalError::ApiError(_) => {
                "Check your network connection and the content API base URL".to_string()
            }
            JournalError::ContentApiError { status, .. } if *status == 401 || *status == 403 => {
                "Check the space id and the delivery access token".to_string()
            }
            JournalError::ContentApiError { status, .. } if *status == 404 => {
                "Check the space id, environment and content type ids".to_string()
            }
            JournalError::ContentApiError { .. } => {
                "The content backend rejected the request; try again later".to_string()
            }
            JournalError::ConfigValidationError { field, .. }
            | JournalError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in your configuration", field)
            }
            JournalError::MissingConfigError { field } => {
                format!("Provide '{}' via flag, environment or config file", field)
            }
            JournalError::IoError(_) | JournalError::ZipError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            JournalError::CsvError(_)
            | JournalError::SerializationError(_)
            | JournalError::ProcessingError { .. } => {
                "Inspect the content entries for unexpected field shapes".to_string()
            }
            JournalError::Cancelled => "Run the command again to rebuild the bundle".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not load content: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Could not process content: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, JournalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_suggests_token_check() {
        let err = JournalError::ContentApiError {
            status: 401,
            message: "The access token you sent could not be found".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("access token"));
        assert!(err.user_friendly_message().starts_with("Could not load content"));
    }

    #[test]
    fn test_cancelled_is_low_severity() {
        assert_eq!(JournalError::Cancelled.severity(), ErrorSeverity::Low);
        assert_eq!(JournalError::Cancelled.category(), ErrorCategory::System);
        assert_eq!(JournalError::Cancelled.exit_code(), 0);
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        let io = JournalError::IoError(std::io::Error::other("disk full"));
        assert_eq!(io.exit_code(), 3);

        let processing = JournalError::ProcessingError {
            message: "bad".to_string(),
        };
        assert_eq!(processing.exit_code(), 1);
    }

    #[test]
    fn test_missing_config_mentions_field() {
        let err = JournalError::MissingConfigError {
            field: "space_id".to_string(),
        };
        assert!(err.to_string().contains("space_id"));
        assert!(err.recovery_suggestion().contains("space_id"));
    }
}
