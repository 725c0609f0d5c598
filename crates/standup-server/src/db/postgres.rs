use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use standup_core::{NewUpdate, Update, UpdateFilter, UpdatePatch};
use uuid::Uuid;

use super::models::UpdateRow;
use super::UpdateStore;
use crate::error::AppError;

/// PostgreSQL-backed update store
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    ttl: Duration,
}

impl Database {
    /// Connect to the database
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        ttl: Duration,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool, ttl })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Records created at or before this instant are expired
    fn cutoff(&self) -> DateTime<Utc> {
        Utc::now()
            .checked_sub_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Split a clearable field into "was supplied" and the new value
fn change(field: &Option<Option<String>>) -> (bool, Option<&str>) {
    (field.is_some(), field.as_ref().and_then(|v| v.as_deref()))
}

#[async_trait]
impl UpdateStore for Database {
    async fn create(&self, new: NewUpdate) -> Result<Update, AppError> {
        let row = sqlx::query_as::<_, UpdateRow>(
            r#"
            INSERT INTO updates
                (employee_name, date, updates, github_issue_link, issue_description, build_number, issue_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, employee_name, date, updates, github_issue_link, issue_description,
                      build_number, issue_status, created_at, updated_at
            "#,
        )
        .bind(new.employee_name.as_str())
        .bind(new.date)
        .bind(new.updates.as_str())
        .bind(new.github_issue_link.as_deref())
        .bind(new.issue_description.as_deref())
        .bind(new.build_number.as_deref())
        .bind(new.issue_status.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list(&self, filter: &UpdateFilter) -> Result<Vec<Update>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, employee_name, date, updates, github_issue_link, issue_description, \
             build_number, issue_status, created_at, updated_at FROM updates WHERE created_at > ",
        );
        query.push_bind(self.cutoff());

        if let Some(date) = filter.date {
            query.push(" AND date = ").push_bind(date);
        }
        if let Some(from) = filter.from {
            query.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND date <= ").push_bind(to);
        }
        if let Some(employee) = &filter.employee {
            query
                .push(" AND strpos(lower(employee_name), ")
                .push_bind(employee.clone())
                .push(") > 0");
        }
        query.push(" ORDER BY date DESC, created_at DESC");

        let rows = query
            .build_query_as::<UpdateRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Update::try_from).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Update>, AppError> {
        let row = sqlx::query_as::<_, UpdateRow>(
            r#"
            SELECT id, employee_name, date, updates, github_issue_link, issue_description,
                   build_number, issue_status, created_at, updated_at
            FROM updates WHERE id = $1 AND created_at > $2
            "#,
        )
        .bind(id)
        .bind(self.cutoff())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Update::try_from).transpose()
    }

    async fn patch(&self, id: Uuid, patch: &UpdatePatch) -> Result<Option<Update>, AppError> {
        let (set_link, link) = change(&patch.github_issue_link);
        let (set_description, description) = change(&patch.issue_description);
        let (set_build, build) = change(&patch.build_number);

        let row = sqlx::query_as::<_, UpdateRow>(
            r#"
            UPDATE updates SET
                employee_name = COALESCE($1, employee_name),
                date = COALESCE($2, date),
                updates = COALESCE($3, updates),
                github_issue_link = CASE WHEN $4 THEN $5 ELSE github_issue_link END,
                issue_description = CASE WHEN $6 THEN $7 ELSE issue_description END,
                build_number = CASE WHEN $8 THEN $9 ELSE build_number END,
                issue_status = COALESCE($10, issue_status),
                updated_at = NOW()
            WHERE id = $11 AND created_at > $12
            RETURNING id, employee_name, date, updates, github_issue_link, issue_description,
                      build_number, issue_status, created_at, updated_at
            "#,
        )
        .bind(patch.employee_name.as_deref())
        .bind(patch.date)
        .bind(patch.updates.as_deref())
        .bind(set_link)
        .bind(link)
        .bind(set_description)
        .bind(description)
        .bind(set_build)
        .bind(build)
        .bind(patch.issue_status.map(|s| s.as_str()))
        .bind(id)
        .bind(self.cutoff())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Update::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM updates WHERE id = $1 AND created_at > $2")
            .bind(id)
            .bind(self.cutoff())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM updates WHERE created_at <= $1")
            .bind(self.cutoff())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
