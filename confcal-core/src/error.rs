//! Error types for confcal.

use thiserror::Error;

/// Errors that can occur while mirroring an agenda into a calendar.
#[derive(Error, Debug)]
pub enum ConfcalError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A record lacks one of title, start date, start time or end time.
    #[error("Session '{title}' is missing required field '{field}'")]
    MissingRequiredField { title: String, field: &'static str },

    #[error("Could not parse date/time '{input}' for session '{title}'")]
    DateParse { title: String, input: String },

    #[error("Agenda lists more than one session titled '{0}'")]
    DuplicateTitle(String),

    #[error("Agenda error: {0}")]
    Source(String),

    #[error("Calendar error: {0}")]
    Gateway(String),

    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ConfcalError {
    /// Whether the error only invalidates one agenda record, not the run.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            ConfcalError::MissingRequiredField { .. } | ConfcalError::DateParse { .. }
        )
    }
}

/// Result type alias for confcal operations.
pub type ConfcalResult<T> = Result<T, ConfcalError>;
