use thiserror::Error;

#[derive(Error, Debug)]
pub enum SgisError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("SGIS returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("[{code}] {message}")]
    Service { code: i64, message: String },

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Service,
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

/// SGIS error code for an expired or invalid access token.
pub const ERR_CD_AUTH: i64 = -401;

impl SgisError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SgisError::ApiError(_) | SgisError::HttpStatus { .. } => ErrorCategory::Network,
            SgisError::Service { .. } => ErrorCategory::Service,
            SgisError::ConfigValidationError { .. }
            | SgisError::InvalidConfigValueError { .. }
            | SgisError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SgisError::CsvError(_)
            | SgisError::SerializationError(_)
            | SgisError::ProcessingError { .. } => ErrorCategory::Data,
            SgisError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SgisError::ApiError(_) | SgisError::HttpStatus { .. } => ErrorSeverity::Medium,
            SgisError::Service { code, .. } if *code == ERR_CD_AUTH => ErrorSeverity::Medium,
            SgisError::Service { .. } => ErrorSeverity::High,
            SgisError::ConfigValidationError { .. }
            | SgisError::InvalidConfigValueError { .. }
            | SgisError::MissingConfigError { .. } => ErrorSeverity::High,
            SgisError::CsvError(_)
            | SgisError::SerializationError(_)
            | SgisError::ProcessingError { .. } => ErrorSeverity::High,
            SgisError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SgisError::ApiError(_) => "Check network connectivity and the configured base URL",
            SgisError::HttpStatus { .. } => "The SGIS service may be unavailable, retry later",
            SgisError::Service { code, .. } if *code == ERR_CD_AUTH => {
                "Verify the consumer key and secret, then retry"
            }
            SgisError::Service { .. } => "Check the request parameters against the SGIS API guide",
            SgisError::ConfigValidationError { .. } | SgisError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again"
            }
            SgisError::MissingConfigError { .. } => {
                "Provide the value via command line, environment variable or config file"
            }
            SgisError::CsvError(_) | SgisError::SerializationError(_) => {
                "The response format may have changed, try --format json"
            }
            SgisError::ProcessingError { .. } => "Inspect the raw response with --verbose",
            SgisError::IoError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SgisError::ApiError(e) if e.is_timeout() => "The SGIS request timed out".to_string(),
            SgisError::ApiError(_) => "Could not reach the SGIS service".to_string(),
            SgisError::Service { code, message } => {
                format!("SGIS rejected the request ({}): {}", code, message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SgisError>;
