use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::status::IssueStatus;
use crate::update::Update;

/// Raw update fields as submitted by the client.
///
/// Every field is optional at this level; [`NewUpdate`] and [`UpdatePatch`]
/// decide which ones are required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFields {
    pub employee_name: Option<String>,
    pub date: Option<String>,
    pub updates: Option<String>,
    pub github_issue_link: Option<String>,
    pub issue_description: Option<String>,
    pub build_number: Option<String>,
    pub issue_status: Option<String>,
    /// Minutes from client local time to UTC, as `Date.getTimezoneOffset()`
    /// reports them (UTC+05:30 is -330)
    pub timezone_offset: Option<i32>,
}

/// Longest UTC offset in use anywhere, in minutes
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps contribute the date in their own offset, so
/// `2024-05-01T23:30:00-02:00` is May 1st.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    parse_date_in(field, value, None)
}

/// Like [`parse_date`], but a timestamp is first shifted into `local` when
/// given. Browsers serialize a picked local midnight as UTC, which lands on
/// the previous day east of Greenwich.
pub fn parse_date_in(
    field: &'static str,
    value: &str,
    local: Option<FixedOffset>,
) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| {
            DateTime::parse_from_rfc3339(value).map(|dt| match local {
                Some(offset) => dt.with_timezone(&offset).date_naive(),
                None => dt.date_naive(),
            })
        })
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

/// Convert a `getTimezoneOffset()` value into the client's UTC offset
pub fn client_offset(minutes: Option<i32>) -> Result<Option<FixedOffset>> {
    let Some(minutes) = minutes else {
        return Ok(None);
    };
    if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
        return Err(ValidationError::InvalidTimezoneOffset(minutes));
    }
    FixedOffset::west_opt(minutes * 60)
        .map(Some)
        .ok_or(ValidationError::InvalidTimezoneOffset(minutes))
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Blank text counts as absent
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn status(value: &str) -> Result<IssueStatus> {
    let value = value.trim();
    if value.is_empty() {
        Ok(IssueStatus::default())
    } else {
        value.parse()
    }
}

/// A validated record ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewUpdate {
    pub employee_name: String,
    pub date: NaiveDate,
    pub updates: String,
    pub github_issue_link: Option<String>,
    pub issue_description: Option<String>,
    pub build_number: Option<String>,
    pub issue_status: IssueStatus,
}

impl NewUpdate {
    /// Materialize the stored record with store-assigned id and timestamps
    pub fn into_update(self, id: Uuid, now: DateTime<Utc>) -> Update {
        Update {
            id,
            employee_name: self.employee_name,
            date: self.date,
            updates: self.updates,
            github_issue_link: self.github_issue_link,
            issue_description: self.issue_description,
            build_number: self.build_number,
            issue_status: self.issue_status,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<UpdateFields> for NewUpdate {
    type Error = ValidationError;

    fn try_from(fields: UpdateFields) -> Result<Self> {
        let local = client_offset(fields.timezone_offset)?;
        let employee_name = required("employeeName", fields.employee_name)?;
        let date = required("date", fields.date)?;
        let date = parse_date_in("date", &date, local)?;
        let updates = required("updates", fields.updates)?;
        let issue_status = match fields.issue_status {
            Some(s) => status(&s)?,
            None => IssueStatus::default(),
        };

        Ok(Self {
            employee_name,
            date,
            updates,
            github_issue_link: optional(fields.github_issue_link),
            issue_description: optional(fields.issue_description),
            build_number: optional(fields.build_number),
            issue_status,
        })
    }
}

/// A validated partial update.
///
/// `None` leaves a field unchanged. For the optional text fields
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePatch {
    pub employee_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub updates: Option<String>,
    pub github_issue_link: Option<Option<String>>,
    pub issue_description: Option<Option<String>>,
    pub build_number: Option<Option<String>>,
    pub issue_status: Option<IssueStatus>,
}

impl UpdatePatch {
    /// Apply the patch in place and refresh the modification time
    pub fn apply(&self, update: &mut Update, now: DateTime<Utc>) {
        if let Some(name) = &self.employee_name {
            update.employee_name = name.clone();
        }
        if let Some(date) = self.date {
            update.date = date;
        }
        if let Some(text) = &self.updates {
            update.updates = text.clone();
        }
        if let Some(link) = &self.github_issue_link {
            update.github_issue_link = link.clone();
        }
        if let Some(description) = &self.issue_description {
            update.issue_description = description.clone();
        }
        if let Some(build) = &self.build_number {
            update.build_number = build.clone();
        }
        if let Some(status) = self.issue_status {
            update.issue_status = status;
        }
        update.updated_at = now;
    }
}

impl TryFrom<UpdateFields> for UpdatePatch {
    type Error = ValidationError;

    fn try_from(fields: UpdateFields) -> Result<Self> {
        let local = client_offset(fields.timezone_offset)?;
        let employee_name = fields
            .employee_name
            .map(|v| required("employeeName", Some(v)))
            .transpose()?;
        let date = fields
            .date
            .map(|v| parse_date_in("date", &v, local))
            .transpose()?;
        let updates = fields
            .updates
            .map(|v| required("updates", Some(v)))
            .transpose()?;
        let issue_status = fields.issue_status.map(|s| status(&s)).transpose()?;

        Ok(Self {
            employee_name,
            date,
            updates,
            github_issue_link: fields.github_issue_link.map(|v| optional(Some(v))),
            issue_description: fields.issue_description.map(|v| optional(Some(v))),
            build_number: fields.build_number.map(|v| optional(Some(v))),
            issue_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn required_only() -> UpdateFields {
        UpdateFields {
            employee_name: Some("Asha".into()),
            date: Some("2024-05-01".into()),
            updates: Some("fixed login".into()),
            ..Default::default()
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("date", "2024-05-01").unwrap(), day(2024, 5, 1));
        assert_eq!(
            parse_date("date", "2024-05-01T10:15:00.000Z").unwrap(),
            day(2024, 5, 1)
        );
        assert_eq!(
            parse_date("date", "2024-05-01T23:30:00-02:00").unwrap(),
            day(2024, 5, 1)
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let err = parse_date("date", "yesterday").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidDate {
                field: "date",
                value: "yesterday".into()
            }
        );
        assert!(parse_date("date", "2024-13-01").is_err());
    }

    #[test]
    fn test_client_offset_shifts_timestamp_dates() {
        // midnight May 1st in UTC+05:30, as the browser serializes it
        let picked = "2024-04-30T18:30:00.000Z";
        let india = client_offset(Some(-330)).unwrap();
        assert_eq!(parse_date_in("date", picked, india).unwrap(), day(2024, 5, 1));
        assert_eq!(parse_date_in("date", picked, None).unwrap(), day(2024, 4, 30));

        let new_york = client_offset(Some(240)).unwrap();
        assert_eq!(
            parse_date_in("date", "2024-05-01T04:00:00.000Z", new_york).unwrap(),
            day(2024, 5, 1)
        );
        assert_eq!(
            parse_date_in("date", "2024-05-01", india).unwrap(),
            day(2024, 5, 1)
        );
    }

    #[test]
    fn test_client_offset_range() {
        assert_eq!(client_offset(None).unwrap(), None);
        assert!(client_offset(Some(840)).unwrap().is_some());
        assert_eq!(
            client_offset(Some(841)).unwrap_err(),
            ValidationError::InvalidTimezoneOffset(841)
        );
        assert!(client_offset(Some(i32::MIN)).is_err());
    }

    #[test]
    fn test_new_update_uses_client_offset() {
        let new = NewUpdate::try_from(UpdateFields {
            date: Some("2024-04-30T18:30:00.000Z".into()),
            timezone_offset: Some(-330),
            ..required_only()
        })
        .unwrap();
        assert_eq!(new.date, day(2024, 5, 1));
    }

    #[test]
    fn test_new_update_defaults() {
        let new = NewUpdate::try_from(required_only()).unwrap();
        assert_eq!(new.employee_name, "Asha");
        assert_eq!(new.date, day(2024, 5, 1));
        assert_eq!(new.issue_status, IssueStatus::NotApplicable);
        assert_eq!(new.github_issue_link, None);
        assert_eq!(new.build_number, None);
    }

    #[test]
    fn test_new_update_missing_required_fields() {
        for (field, fields) in [
            ("employeeName", UpdateFields { employee_name: None, ..required_only() }),
            ("date", UpdateFields { date: None, ..required_only() }),
            ("updates", UpdateFields { updates: Some("   ".into()), ..required_only() }),
        ] {
            assert_eq!(
                NewUpdate::try_from(fields).unwrap_err(),
                ValidationError::MissingField(field)
            );
        }
    }

    #[test]
    fn test_new_update_optional_fields() {
        let fields = UpdateFields {
            github_issue_link: Some("https://github.com/org/repo/issues/7".into()),
            issue_description: Some("  ".into()),
            build_number: Some(" 1.4.2 ".into()),
            issue_status: Some("Opened".into()),
            ..required_only()
        };
        let new = NewUpdate::try_from(fields).unwrap();
        assert_eq!(
            new.github_issue_link.as_deref(),
            Some("https://github.com/org/repo/issues/7")
        );
        assert_eq!(new.issue_description, None);
        assert_eq!(new.build_number.as_deref(), Some("1.4.2"));
        assert_eq!(new.issue_status, IssueStatus::Opened);
    }

    #[test]
    fn test_new_update_rejects_unknown_status() {
        let fields = UpdateFields {
            issue_status: Some("Pending".into()),
            ..required_only()
        };
        assert!(matches!(
            NewUpdate::try_from(fields),
            Err(ValidationError::InvalidIssueStatus(_))
        ));
    }

    #[test]
    fn test_patch_from_empty_fields_changes_nothing() {
        let patch = UpdatePatch::try_from(UpdateFields::default()).unwrap();
        assert_eq!(patch, UpdatePatch::default());
    }

    #[test]
    fn test_patch_blank_required_field_rejected() {
        let fields = UpdateFields {
            employee_name: Some("".into()),
            ..Default::default()
        };
        assert_eq!(
            UpdatePatch::try_from(fields).unwrap_err(),
            ValidationError::MissingField("employeeName")
        );
    }

    #[test]
    fn test_patch_apply_changes_only_supplied_fields() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut record = NewUpdate::try_from(UpdateFields {
            build_number: Some("41".into()),
            github_issue_link: Some("https://github.com/org/repo/issues/1".into()),
            ..required_only()
        })
        .unwrap()
        .into_update(Uuid::new_v4(), created);
        let before = record.clone();

        let patch = UpdatePatch::try_from(UpdateFields {
            updates: Some("shipped fix".into()),
            github_issue_link: Some("".into()),
            issue_status: Some("Closed".into()),
            ..Default::default()
        })
        .unwrap();
        let later = created + chrono::Duration::hours(2);
        patch.apply(&mut record, later);

        assert_eq!(record.updates, "shipped fix");
        assert_eq!(record.github_issue_link, None);
        assert_eq!(record.issue_status, IssueStatus::Closed);
        assert_eq!(record.employee_name, before.employee_name);
        assert_eq!(record.date, before.date);
        assert_eq!(record.build_number, before.build_number);
        assert_eq!(record.id, before.id);
        assert_eq!(record.created_at, created);
        assert_eq!(record.updated_at, later);
    }
}
