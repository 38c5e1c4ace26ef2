use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::routes::reading_log::model::{ReadingLog, ReadingStatus};

/// Derived aggregate over one child's reading logs. Computed per request,
/// never persisted.
#[derive(Debug, Serialize)]
pub struct ReadingSummary {
    pub child_id: i64,
    pub name: String,
    #[serde(rename = "currentBook", skip_serializing_if = "Option::is_none")]
    pub current_book: Option<ReadingLog>,
    #[serde(rename = "lastCompletedBook", skip_serializing_if = "Option::is_none")]
    pub last_completed_book: Option<ReadingLog>,
    #[serde(rename = "totalUncompletedBooks")]
    pub total_uncompleted_books: u32,
    #[serde(rename = "totalBooksReadThisMonth")]
    pub total_books_read_this_month: u32,
    #[serde(rename = "totalBooksReadThisYear")]
    pub total_books_read_this_year: u32,
    #[serde(rename = "totalCompletedBooks")]
    pub total_completed_books: u32,
}

impl ReadingSummary {
    /// Aggregates a child's logs against an injected `today`. Input order
    /// does not matter: logs are re-sorted by date descending with creation
    /// time as tiebreak before picking the current and last-completed books.
    pub fn compute(child_id: i64, name: String, mut logs: Vec<ReadingLog>, today: NaiveDate) -> Self {
        logs.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        let mut summary = ReadingSummary {
            child_id,
            name,
            current_book: None,
            last_completed_book: None,
            total_uncompleted_books: 0,
            total_books_read_this_month: 0,
            total_books_read_this_year: 0,
            total_completed_books: 0,
        };

        for log in logs {
            match log.status {
                ReadingStatus::Started => {
                    summary.total_uncompleted_books += 1;
                    if summary.current_book.is_none() {
                        summary.current_book = Some(log);
                    }
                }
                ReadingStatus::Completed => {
                    summary.total_completed_books += 1;
                    if log.date.year() == today.year() {
                        summary.total_books_read_this_year += 1;
                        if log.date.month() == today.month() {
                            summary.total_books_read_this_month += 1;
                        }
                    }
                    if summary.last_completed_book.is_none() {
                        summary.last_completed_book = Some(log);
                    }
                }
            }
        }

        summary
    }
}
