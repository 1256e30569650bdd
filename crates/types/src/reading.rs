//! Reading entries: one per (user, book) pair.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::book::Book;
use crate::ids::{BookId, ReadingId, UserId};
use crate::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    #[default]
    WantToRead,
    CurrentlyReading,
    Finished,
}

impl ReadingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "want_to_read",
            ReadingStatus::CurrentlyReading => "currently_reading",
            ReadingStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReadingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "want_to_read" => Ok(ReadingStatus::WantToRead),
            "currently_reading" => Ok(ReadingStatus::CurrentlyReading),
            "finished" => Ok(ReadingStatus::Finished),
            other => Err(format!("unknown reading status: {other}")),
        }
    }
}

/// A user's library entry for one book.
///
/// Feed responses embed the author of a public review in `user` and attach
/// interaction counts; plain library listings leave those empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: ReadingId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub status: ReadingStatus,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub is_review_public: Option<bool>,
    #[serde(default)]
    pub progress_pages: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default, with = "crate::timestamp::option")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::timestamp::option")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub book: Option<Book>,
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub like_count: Option<u32>,
    #[serde(default)]
    pub comment_count: Option<u32>,
    #[serde(default)]
    pub is_liked: Option<bool>,
}

impl Reading {
    pub fn has_public_review(&self) -> bool {
        self.is_review_public.unwrap_or(false)
            && self.review.as_deref().is_some_and(|r| !r.trim().is_empty())
    }
}

/// Body of `POST /readings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReading {
    pub book_id: BookId,
    pub status: ReadingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    pub progress_pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

impl NewReading {
    pub fn new(book_id: BookId, status: ReadingStatus) -> Self {
        Self {
            book_id,
            status,
            rating: None,
            review: None,
            progress_pages: 0,
            total_pages: None,
        }
    }
}

/// Body of `PUT /readings/{id}`. Only present fields are changed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReadingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReadingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_review_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_pages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidUpdate {
    #[error("Rating must be between 1 and 5, got {0}")]
    Rating(u8),

    #[error("Progress cannot be negative, got {0}")]
    NegativeProgress(i64),

    #[error("Total pages must be positive, got {0}")]
    TotalPages(i64),

    #[error("Update does not change anything")]
    Empty,
}

impl ReadingUpdate {
    pub fn status(status: ReadingStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check the update locally before it is sent.
    pub fn validate(&self) -> Result<(), InvalidUpdate> {
        if self.is_empty() {
            return Err(InvalidUpdate::Empty);
        }
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err(InvalidUpdate::Rating(rating));
            }
        }
        if let Some(progress) = self.progress_pages {
            if progress < 0 {
                return Err(InvalidUpdate::NegativeProgress(progress));
            }
        }
        if let Some(total) = self.total_pages {
            if total <= 0 {
                return Err(InvalidUpdate::TotalPages(total));
            }
        }
        Ok(())
    }
}
