use chrono::{DateTime, NaiveDate, Utc};
use standup_core::{IssueStatus, Update};
use uuid::Uuid;

use crate::error::AppError;

/// Row of the `updates` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UpdateRow {
    pub id: Uuid,
    pub employee_name: String,
    pub date: NaiveDate,
    pub updates: String,
    pub github_issue_link: Option<String>,
    pub issue_description: Option<String>,
    pub build_number: Option<String>,
    pub issue_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UpdateRow> for Update {
    type Error = AppError;

    fn try_from(row: UpdateRow) -> Result<Self, Self::Error> {
        let issue_status: IssueStatus = row.issue_status.parse().map_err(|_| {
            AppError::Internal(format!(
                "update {} has unknown issue status '{}'",
                row.id, row.issue_status
            ))
        })?;

        Ok(Update {
            id: row.id,
            employee_name: row.employee_name,
            date: row.date,
            updates: row.updates,
            github_issue_link: row.github_issue_link,
            issue_description: row.issue_description,
            build_number: row.build_number,
            issue_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> UpdateRow {
        let now = Utc::now();
        UpdateRow {
            id: Uuid::new_v4(),
            employee_name: "Asha".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            updates: "work".into(),
            github_issue_link: None,
            issue_description: Some("flaky test".into()),
            build_number: None,
            issue_status: status.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_converts() {
        let update = Update::try_from(row("Opened")).unwrap();
        assert_eq!(update.issue_status, IssueStatus::Opened);
        assert_eq!(update.issue_description.as_deref(), Some("flaky test"));
    }

    #[test]
    fn test_row_with_unknown_status_is_internal_error() {
        assert!(matches!(
            Update::try_from(row("Pending")),
            Err(AppError::Internal(_))
        ));
    }
}
