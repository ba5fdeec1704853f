use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigratorError {
    #[error("Could not retrieve feed with ID {feed_id}.")]
    NotFound { feed_id: u64 },

    #[error("The selected feed (ID {feed_id}) does not belong to form {form_id}.")]
    Mismatch {
        feed_id: u64,
        form_id: u64,
        actual_form_id: u64,
    },

    #[error("Invalid JSON. Could not decode the feed data: {reason}")]
    MalformedInput { reason: String },

    #[error("Error importing feed: {reason}")]
    PersistFailed { reason: String },

    #[error("Store validation error: {message}")]
    ValidationError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Store API error: {message} (status: {status})")]
    ApiStatusError { status: u16, message: String },

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lookup,
    Input,
    Store,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl MigratorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MigratorError::NotFound { .. } | MigratorError::Mismatch { .. } => {
                ErrorCategory::Lookup
            }
            MigratorError::MalformedInput { .. } => ErrorCategory::Input,
            MigratorError::PersistFailed { .. }
            | MigratorError::ValidationError { .. }
            | MigratorError::ApiError(_)
            | MigratorError::ApiStatusError { .. } => ErrorCategory::Store,
            MigratorError::ConfigError { .. }
            | MigratorError::ConfigValidationError { .. }
            | MigratorError::InvalidConfigValueError { .. }
            | MigratorError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MigratorError::IoError(_) | MigratorError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Lookup | ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Store | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給操作者看的單行訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            MigratorError::MalformedInput { .. } => {
                "Invalid JSON. Could not decode the feed data.".to_string()
            }
            MigratorError::ApiError(e) => format!("Could not reach the feed store: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MigratorError::NotFound { .. } => {
                "List the feeds of the form again and pick an existing feed ID"
            }
            MigratorError::Mismatch { .. } => {
                "Select the form that owns the feed before exporting it"
            }
            MigratorError::MalformedInput { .. } => {
                "Paste the unmodified body of a previous export (a non-empty JSON object)"
            }
            MigratorError::PersistFailed { .. } | MigratorError::ValidationError { .. } => {
                "Check that the destination form exists and the feed meta is valid for its add-on"
            }
            MigratorError::ApiError(_) | MigratorError::ApiStatusError { .. } => {
                "Check the store endpoint and credentials, then retry"
            }
            MigratorError::IoError(_) => "Check file paths and permissions",
            MigratorError::SerializationError(_) => "Check that the store file contains valid JSON",
            MigratorError::ConfigError { .. }
            | MigratorError::ConfigValidationError { .. }
            | MigratorError::InvalidConfigValueError { .. }
            | MigratorError::MissingConfigError { .. } => {
                "Fix the configuration file or command line flags and run again"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, MigratorError>;
