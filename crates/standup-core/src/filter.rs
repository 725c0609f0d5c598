use chrono::NaiveDate;
use serde::Deserialize;
use std::cmp::Ordering;

use crate::error::{Result, ValidationError};
use crate::input::{client_offset, parse_date_in};
use crate::update::Update;

/// Query string parameters accepted by the list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub employee: Option<String>,
    /// Client `getTimezoneOffset()` used to read timestamp dates
    #[serde(rename = "timezoneOffset")]
    pub timezone_offset: Option<i32>,
}

/// Criteria for listing updates. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFilter {
    /// Exact calendar date
    pub date: Option<NaiveDate>,
    /// Inclusive lower bound
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound
    pub to: Option<NaiveDate>,
    /// Case-insensitive substring of the employee name, stored lowercased
    pub employee: Option<String>,
}

impl UpdateFilter {
    pub fn matches(&self, update: &Update) -> bool {
        if self.date.is_some_and(|d| update.date != d) {
            return false;
        }
        if self.from.is_some_and(|d| update.date < d) {
            return false;
        }
        if self.to.is_some_and(|d| update.date > d) {
            return false;
        }
        match &self.employee {
            Some(needle) => update.employee_name.to_lowercase().contains(needle),
            None => true,
        }
    }
}

impl TryFrom<FilterParams> for UpdateFilter {
    type Error = ValidationError;

    fn try_from(params: FilterParams) -> Result<Self> {
        let local = client_offset(params.timezone_offset)?;
        let date = |field: &'static str, value: Option<String>| -> Result<Option<NaiveDate>> {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| parse_date_in(field, &v, local))
                .transpose()
        };

        let filter = Self {
            date: date("date", params.date)?,
            from: date("from", params.from)?,
            to: date("to", params.to)?,
            employee: params
                .employee
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty()),
        };

        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(ValidationError::InvalidRange {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }

        Ok(filter)
    }
}

/// List order: latest date first, then most recently created
pub fn newest_first(a: &Update, b: &Update) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.created_at.cmp(&a.created_at))
}
