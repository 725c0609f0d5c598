use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::IssueStatus;

/// Records are removed this long after creation (30 days)
pub const DEFAULT_TTL_SECS: i64 = 2_592_000;

/// Longest accepted record lifetime (100 years)
pub const MAX_TTL_SECS: i64 = 3_153_600_000;

/// Line prefixes the client uses to render update items as a list
const BULLET_MARKERS: &[char] = &['•', '-', '*'];

/// The default record lifetime as a duration
pub fn default_ttl() -> Duration {
    Duration::seconds(DEFAULT_TTL_SECS)
}

/// One employee's status entry for a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub employee_name: String,
    /// The day the update is about, not when it was written
    pub date: NaiveDate,
    /// Free text, one item per line
    pub updates: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_issue_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
    #[serde(default)]
    pub issue_status: IssueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Update {
    /// Individual line items of the update text, bullet markers stripped
    pub fn items(&self) -> Vec<&str> {
        self.updates
            .lines()
            .map(strip_bullet)
            .filter(|item| !item.is_empty())
            .collect()
    }

    /// Instant after which the record no longer exists, saturating at the
    /// end of representable time
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.created_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now >= self.expires_at(ttl)
    }
}

fn strip_bullet(line: &str) -> &str {
    let line = line.trim();
    match line.strip_prefix(BULLET_MARKERS) {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(updates: &str) -> Update {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Update {
            id: Uuid::new_v4(),
            employee_name: "Asha".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            updates: updates.into(),
            github_issue_link: None,
            issue_description: None,
            build_number: None,
            issue_status: IssueStatus::default(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_items_split_lines_and_strip_markers() {
        let update = sample("• fixed login\n- wrote tests\n\n  * reviewed PR  \nplain line");
        assert_eq!(
            update.items(),
            vec!["fixed login", "wrote tests", "reviewed PR", "plain line"]
        );
    }

    #[test]
    fn test_items_single_line() {
        assert_eq!(sample("deployed build 42").items(), vec!["deployed build 42"]);
    }

    #[test]
    fn test_expiry_is_thirty_days_after_creation() {
        let update = sample("x");
        let ttl = default_ttl();
        assert_eq!(update.expires_at(ttl) - update.created_at, Duration::days(30));

        assert!(!update.is_expired(update.created_at + Duration::days(29), ttl));
        assert!(update.is_expired(update.created_at + Duration::days(30), ttl));
        assert!(update.is_expired(update.created_at + Duration::days(31), ttl));
    }

    #[test]
    fn test_expiry_saturates_on_huge_ttl() {
        let update = sample("x");
        let ttl = Duration::days(1_000_000_000);
        assert_eq!(update.expires_at(ttl), DateTime::<Utc>::MAX_UTC);
        assert!(!update.is_expired(Utc::now(), ttl));
    }

    #[test]
    fn test_json_shape() {
        let update = sample("x");
        let json = serde_json::to_value(&update).unwrap();

        assert_eq!(json["_id"], update.id.to_string());
        assert_eq!(json["employeeName"], "Asha");
        assert_eq!(json["date"], "2024-05-01");
        assert_eq!(json["issueStatus"], "N/A");
        assert!(json.get("githubIssueLink").is_none());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
