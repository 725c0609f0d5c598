use thiserror::Error;

/// Reasons an incoming update payload or filter is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or blank
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A date that is neither `YYYY-MM-DD` nor an RFC 3339 timestamp
    #[error("{field}: invalid date '{value}'")]
    InvalidDate { field: &'static str, value: String },

    /// An issue status outside N/A, Opened, Closed
    #[error("issueStatus: '{0}' is not a valid enum value")]
    InvalidIssueStatus(String),

    /// A client UTC offset outside ±14 hours
    #[error("timezoneOffset: {0} minutes is out of range")]
    InvalidTimezoneOffset(i32),

    /// A date range whose start lies after its end
    #[error("from ({from}) must not be after to ({to})")]
    InvalidRange { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, ValidationError>;
