//! Repository traits and the `SQLite` implementation for records and alerts.
//!
//! Every method takes the owning `user_id` and folds it into the query, so a
//! caller cannot reach another user's rows even by constructing a hostile
//! id. Mutations report whether a row was actually touched; the API layer
//! turns "not touched" into a 404.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use super::StoreError;
use crate::alerts::{Alert, AlertCategory, AlertDraft, AlertFilter, AlertSeverity};
use crate::records::{
    HealthRecord, NewHealthRecord, RecordMetrics, RecordStatus, RecordType,
};

/// Per-type record totals for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub total: i64,
    pub human: i64,
    pub animal: i64,
    pub environment: i64,
}

/// Unread alert totals for one user, with the two urgent severities broken
/// out for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertCounts {
    pub unread: i64,
    pub critical: i64,
    pub high: i64,
}

/// Health record persistence operations.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Inserts a new record, assigning id and creation timestamp.
    async fn create_record(&self, new: NewHealthRecord) -> Result<HealthRecord, StoreError>;

    /// Lists a user's records, newest first, optionally filtered by type.
    async fn list_records(
        &self,
        user_id: &str,
        record_type: Option<RecordType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HealthRecord>, StoreError>;

    /// Record totals per type for the dashboard.
    async fn count_records(&self, user_id: &str) -> Result<RecordCounts, StoreError>;
}

/// Alert persistence operations.
#[async_trait]
pub trait AlertRepository: Send + Sync {
    /// Inserts one alert, assigning id and creation timestamp. The alert
    /// starts unread.
    async fn create_alert(&self, user_id: &str, draft: &AlertDraft) -> Result<Alert, StoreError>;

    /// Inserts a batch of alerts in one transaction, preserving draft order.
    async fn create_alerts(
        &self,
        user_id: &str,
        drafts: &[AlertDraft],
    ) -> Result<Vec<Alert>, StoreError>;

    /// Lists a user's alerts, newest first, applying the filter.
    async fn list_alerts(
        &self,
        user_id: &str,
        filter: &AlertFilter,
    ) -> Result<Vec<Alert>, StoreError>;

    /// Marks one alert read. Returns `false` if the alert does not exist or
    /// belongs to another user.
    async fn mark_alert_read(&self, user_id: &str, alert_id: &str) -> Result<bool, StoreError>;

    /// Deletes one alert. Returns `false` if the alert does not exist or
    /// belongs to another user.
    async fn delete_alert(&self, user_id: &str, alert_id: &str) -> Result<bool, StoreError>;

    /// Unread alert totals for the dashboard.
    async fn count_unread_alerts(&self, user_id: &str) -> Result<AlertCounts, StoreError>;
}

/// `SQLite`-backed store for records and alerts.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    #[must_use]
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Extracts a non-nullable field from a row, naming the column in the
    /// error.
    fn get_required<'r, T>(row: &'r sqlx::sqlite::SqliteRow, column: &str) -> Result<T, StoreError>
    where
        T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
    {
        row.try_get::<T, _>(column)
            .map_err(|e| StoreError::Database(format!("column '{column}': {e}")))
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<HealthRecord, StoreError> {
        let id: String = Self::get_required(row, "id")?;
        let record_type: String = Self::get_required(row, "record_type")?;
        let metrics_json: Option<String> = row.get("metrics");
        let metrics = RecordMetrics::from_parts(&record_type, metrics_json.as_deref())?;

        let status_raw: String = Self::get_required(row, "status")?;
        let status = RecordStatus::from_str(&status_raw)
            .ok_or_else(|| StoreError::Database(format!("row '{id}': unknown status '{status_raw}'")))?;

        Ok(HealthRecord {
            id,
            user_id: Self::get_required(row, "user_id")?,
            subject_name: Self::get_required(row, "subject_name")?,
            metrics,
            status,
            notes: row.get("notes"),
            created_at: Self::get_required::<DateTime<Utc>>(row, "created_at")?,
        })
    }

    fn row_to_alert(row: &sqlx::sqlite::SqliteRow) -> Result<Alert, StoreError> {
        let id: String = Self::get_required(row, "id")?;

        let severity_raw: String = Self::get_required(row, "severity")?;
        let severity = AlertSeverity::from_str(&severity_raw).ok_or_else(|| {
            StoreError::Database(format!("row '{id}': unknown severity '{severity_raw}'"))
        })?;

        let category_raw: String = Self::get_required(row, "category")?;
        let category = AlertCategory::from_str(&category_raw).ok_or_else(|| {
            StoreError::Database(format!("row '{id}': unknown category '{category_raw}'"))
        })?;

        Ok(Alert {
            id,
            user_id: Self::get_required(row, "user_id")?,
            title: Self::get_required(row, "title")?,
            message: Self::get_required(row, "message")?,
            severity,
            category,
            is_read: Self::get_required(row, "is_read")?,
            created_at: Self::get_required::<DateTime<Utc>>(row, "created_at")?,
        })
    }
}

#[async_trait]
impl RecordRepository for SqliteStore {
    async fn create_record(&self, new: NewHealthRecord) -> Result<HealthRecord, StoreError> {
        let record = HealthRecord {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            subject_name: new.subject_name,
            metrics: new.metrics,
            status: new.status,
            notes: new.notes,
            created_at: Utc::now(),
        };
        let metrics_json = record.metrics.payload_json()?;

        sqlx::query(
            r"
            INSERT INTO health_records (id, user_id, record_type, subject_name,
                                        metrics, status, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(record.record_type().as_str())
        .bind(&record.subject_name)
        .bind(&metrics_json)
        .bind(record.status.as_str())
        .bind(&record.notes)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_records(
        &self,
        user_id: &str,
        record_type: Option<RecordType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HealthRecord>, StoreError> {
        let rows = match record_type {
            Some(rt) => {
                sqlx::query(
                    r"
                    SELECT id, user_id, record_type, subject_name,
                           metrics, status, notes, created_at
                    FROM health_records
                    WHERE user_id = ? AND record_type = ?
                    ORDER BY created_at DESC
                    LIMIT ? OFFSET ?
                    ",
                )
                .bind(user_id)
                .bind(rt.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r"
                    SELECT id, user_id, record_type, subject_name,
                           metrics, status, notes, created_at
                    FROM health_records
                    WHERE user_id = ?
                    ORDER BY created_at DESC
                    LIMIT ? OFFSET ?
                    ",
                )
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn count_records(&self, user_id: &str) -> Result<RecordCounts, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT record_type, COUNT(*) AS n
            FROM health_records
            WHERE user_id = ?
            GROUP BY record_type
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = RecordCounts::default();
        for row in &rows {
            let record_type: String = Self::get_required(row, "record_type")?;
            let n: i64 = Self::get_required(row, "n")?;
            counts.total += n;
            match RecordType::from_str(&record_type) {
                Some(RecordType::Human) => counts.human += n,
                Some(RecordType::Animal) => counts.animal += n,
                Some(RecordType::Environment) => counts.environment += n,
                // Rows a defective writer produced still count toward the
                // total; listing them fails loudly instead.
                None => {}
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl AlertRepository for SqliteStore {
    async fn create_alert(&self, user_id: &str, draft: &AlertDraft) -> Result<Alert, StoreError> {
        let alert = draft.clone().into_alert(Uuid::new_v4().to_string(), user_id, Utc::now());

        sqlx::query(
            r"
            INSERT INTO alerts (id, user_id, title, message, severity, category,
                                is_read, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&alert.id)
        .bind(&alert.user_id)
        .bind(&alert.title)
        .bind(&alert.message)
        .bind(alert.severity.as_str())
        .bind(alert.category.as_str())
        .bind(alert.is_read)
        .bind(alert.created_at)
        .execute(&self.pool)
        .await?;

        Ok(alert)
    }

    async fn create_alerts(
        &self,
        user_id: &str,
        drafts: &[AlertDraft],
    ) -> Result<Vec<Alert>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut alerts = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let alert = draft.clone().into_alert(Uuid::new_v4().to_string(), user_id, Utc::now());
            sqlx::query(
                r"
                INSERT INTO alerts (id, user_id, title, message, severity, category,
                                    is_read, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(&alert.id)
            .bind(&alert.user_id)
            .bind(&alert.title)
            .bind(&alert.message)
            .bind(alert.severity.as_str())
            .bind(alert.category.as_str())
            .bind(alert.is_read)
            .bind(alert.created_at)
            .execute(&mut *tx)
            .await?;
            alerts.push(alert);
        }

        tx.commit().await?;
        Ok(alerts)
    }

    async fn list_alerts(
        &self,
        user_id: &str,
        filter: &AlertFilter,
    ) -> Result<Vec<Alert>, StoreError> {
        let mut sql = String::from(
            "SELECT id, user_id, title, message, severity, category, is_read, created_at \
             FROM alerts WHERE user_id = ?",
        );
        if filter.severity.is_some() {
            sql.push_str(" AND severity = ?");
        }
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if filter.unread_only {
            sql.push_str(" AND is_read = 0");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql).bind(user_id);
        if let Some(severity) = filter.severity {
            query = query.bind(severity.as_str());
        }
        if let Some(category) = filter.category {
            query = query.bind(category.as_str());
        }
        let rows = query.bind(filter.limit).bind(filter.offset).fetch_all(&self.pool).await?;

        rows.iter().map(Self::row_to_alert).collect()
    }

    async fn mark_alert_read(&self, user_id: &str, alert_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE alerts
            SET is_read = 1
            WHERE id = ? AND user_id = ?
            ",
        )
        .bind(alert_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_alert(&self, user_id: &str, alert_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r"
            DELETE FROM alerts
            WHERE id = ? AND user_id = ?
            ",
        )
        .bind(alert_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_unread_alerts(&self, user_id: &str) -> Result<AlertCounts, StoreError> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) AS unread,
                   COALESCE(SUM(CASE WHEN severity = 'critical' THEN 1 ELSE 0 END), 0) AS critical,
                   COALESCE(SUM(CASE WHEN severity = 'high' THEN 1 ELSE 0 END), 0) AS high
            FROM alerts
            WHERE user_id = ? AND is_read = 0
            ",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(AlertCounts {
            unread: Self::get_required(&row, "unread")?,
            critical: Self::get_required(&row, "critical")?,
            high: Self::get_required(&row, "high")?,
        })
    }
}
