use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// State of the external issue linked to an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    /// No issue, or the status is not tracked
    #[default]
    #[serde(rename = "N/A")]
    NotApplicable,
    Opened,
    Closed,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 3] = [
        IssueStatus::NotApplicable,
        IssueStatus::Opened,
        IssueStatus::Closed,
    ];

    /// Wire and storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::NotApplicable => "N/A",
            IssueStatus::Opened => "Opened",
            IssueStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidIssueStatus(s.to_string()))
    }
}
