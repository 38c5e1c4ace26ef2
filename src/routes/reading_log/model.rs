use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::AppError;

/// Reading-log lifecycle. Stored as the Postgres enum `reading_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "reading_status", rename_all = "lowercase")]
pub enum ReadingStatus {
    Started,
    Completed,
}

impl ReadingStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "started" => Some(ReadingStatus::Started),
            "completed" => Some(ReadingStatus::Completed),
            _ => None,
        }
    }
}

/// One reading event for one child. Immutable once created.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReadingLog {
    pub id: i64,
    pub child_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub status: ReadingStatus,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_library_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Raw create-log payload. Required fields arrive as free-form strings so
/// that a missing or malformed value maps to a 400, not a codec rejection.
#[derive(Debug, Deserialize)]
pub struct CreateReadingLogRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "openLibraryKey")]
    pub open_library_key: Option<String>,
    #[serde(default, rename = "coverId")]
    pub cover_id: Option<i32>,
}

/// A create-log payload that passed boundary validation.
#[derive(Debug)]
pub struct NewReadingLog {
    pub title: String,
    pub author: Option<String>,
    pub status: ReadingStatus,
    pub date: NaiveDate,
    pub open_library_key: Option<String>,
    pub cover_id: Option<i32>,
}

impl CreateReadingLogRequest {
    pub fn validate(self) -> Result<NewReadingLog, AppError> {
        if self.title.is_empty() || self.status.is_empty() || self.date.is_empty() {
            return Err(AppError::InvalidArgument(
                "Title, status, and date are required".to_string(),
            ));
        }

        let status = ReadingStatus::parse(&self.status).ok_or_else(|| {
            AppError::InvalidArgument("Status must be 'started' or 'completed'".to_string())
        })?;

        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| {
            AppError::InvalidArgument("Invalid date format. Use YYYY-MM-DD".to_string())
        })?;

        Ok(NewReadingLog {
            title: self.title,
            author: self.author,
            status,
            date,
            open_library_key: self.open_library_key,
            cover_id: self.cover_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChildLogsQuery {
    pub child_id: i64,
}

const LOG_COLUMNS: &str =
    "id, child_id, title, author, status, date, open_library_key, cover_id, created_at";

impl ReadingLog {
    pub async fn create(
        pool: &PgPool,
        child_id: i64,
        new: NewReadingLog,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ReadingLog>(&format!(
            r#"
            INSERT INTO reading_logs (child_id, title, author, status, date, open_library_key, cover_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {LOG_COLUMNS}
            "#
        ))
        .bind(child_id)
        .bind(&new.title)
        .bind(&new.author)
        .bind(new.status)
        .bind(new.date)
        .bind(&new.open_library_key)
        .bind(new.cover_id)
        .fetch_one(pool)
        .await
    }

    /// Most recent first: date descending, then creation time descending.
    pub async fn list_for_child(pool: &PgPool, child_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ReadingLog>(&format!(
            r#"
            SELECT {LOG_COLUMNS} FROM reading_logs
            WHERE child_id = $1
            ORDER BY date DESC, created_at DESC
            "#
        ))
        .bind(child_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, status: &str, date: &str) -> CreateReadingLogRequest {
        CreateReadingLogRequest {
            title: title.to_string(),
            author: None,
            status: status.to_string(),
            date: date.to_string(),
            open_library_key: None,
            cover_id: None,
        }
    }

    #[test]
    fn accepts_both_statuses() {
        let new = request("The Worst Witch", "started", "2025-03-01")
            .validate()
            .unwrap();
        assert_eq!(new.status, ReadingStatus::Started);
        assert_eq!(new.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

        let new = request("The Worst Witch", "completed", "2025-03-02")
            .validate()
            .unwrap();
        assert_eq!(new.status, ReadingStatus::Completed);
    }

    #[test]
    fn rejects_missing_required_fields() {
        for req in [
            request("", "started", "2025-03-01"),
            request("Title", "", "2025-03-01"),
            request("Title", "started", ""),
        ] {
            assert!(matches!(
                req.validate(),
                Err(AppError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn rejects_unknown_status() {
        let err = request("Title", "abandoned", "2025-03-01")
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_unparseable_date() {
        for date in ["03/01/2025", "2025-13-40", "yesterday"] {
            let err = request("Title", "started", date).validate().unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(_)));
        }
    }
}
