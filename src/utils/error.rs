use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Participant count must be an integer between {min} and {max}, got '{value}'")]
    InvalidCount { value: String, min: usize, max: usize },

    #[error("Roster is full: at most {capacity} participants are supported")]
    RosterFull { capacity: usize },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Persistence error ({backend}): {message}")]
    PersistenceError { backend: String, message: String },

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

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StudyError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StudyError::InvalidCount { .. } | StudyError::RosterFull { .. } => ErrorSeverity::Low,
            StudyError::HttpError(_) | StudyError::PersistenceError { .. } => ErrorSeverity::Medium,
            StudyError::ConfigError { .. }
            | StudyError::ConfigValidationError { .. }
            | StudyError::InvalidConfigValueError { .. }
            | StudyError::ValidationError { .. }
            | StudyError::CsvError(_)
            | StudyError::SerializationError(_) => ErrorSeverity::High,
            StudyError::IoError(_) | StudyError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StudyError::InvalidCount { min, max, .. } => {
                format!("Please enter a whole number of participants between {} and {}", min, max)
            }
            StudyError::RosterFull { capacity } => {
                format!("The roster already holds the maximum of {} participants", capacity)
            }
            StudyError::HttpError(_) | StudyError::PersistenceError { .. } => {
                "Could not reach the data store".to_string()
            }
            StudyError::SerializationError(_) => "Saved experiment data is not readable".to_string(),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StudyError::InvalidCount { .. } => "Pass a participant count from 1 to 50",
            StudyError::RosterFull { .. } => "Remove a participant before adding another one",
            StudyError::HttpError(_) | StudyError::PersistenceError { .. } => {
                "Check the remote endpoint or run without --remote-endpoint to use the local file"
            }
            StudyError::SerializationError(_) | StudyError::ValidationError { .. } => {
                "Inspect the data file, or run `clear` and generate a new roster"
            }
            StudyError::ConfigError { .. }
            | StudyError::ConfigValidationError { .. }
            | StudyError::InvalidConfigValueError { .. } => "Fix the configuration file or CLI flags",
            StudyError::CsvError(_) | StudyError::ZipError(_) | StudyError::IoError(_) => {
                "Check that the export directory exists and is writable"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StudyError>;
