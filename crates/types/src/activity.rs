//! Social activity events.
//!
//! On the wire an event is `{ activity_type, activity_data, ... }` where the
//! shape of `activity_data` depends on `activity_type`. Here the pair is
//! decoded into [`ActivityPayload`], one variant per type with its fields
//! spelled out. Types this client does not know, or known types whose data
//! does not match, are kept verbatim in [`ActivityPayload::Other`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{ActivityId, BookId, ReadingId, UserId};
use crate::user::UserSummary;

/// Book reference carried by book-related activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookActivity {
    pub book_id: BookId,
    pub book_title: String,
    pub book_author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_id: Option<ReadingId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_review: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowActivity {
    pub followed_user_id: UserId,
    pub followed_user_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActivityPayload {
    FollowedUser(FollowActivity),
    StartedBook(BookActivity),
    FinishedBook(BookActivity),
    WantToRead(BookActivity),
    RatedBook { book: BookActivity, rating: u8 },
    AddedReview(BookActivity),
    ReviewedBook(BookActivity),
    Other { activity_type: String, data: Value },
}

/// The `activity_type` discriminant, used as a grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    FollowedUser,
    StartedBook,
    FinishedBook,
    WantToRead,
    RatedBook,
    AddedReview,
    ReviewedBook,
    Other(String),
}

impl ActivityKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "followed_user" => ActivityKind::FollowedUser,
            "started_book" => ActivityKind::StartedBook,
            "finished_book" => ActivityKind::FinishedBook,
            "want_to_read" => ActivityKind::WantToRead,
            "rated_book" => ActivityKind::RatedBook,
            "added_review" => ActivityKind::AddedReview,
            "reviewed_book" => ActivityKind::ReviewedBook,
            other => ActivityKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActivityKind::FollowedUser => "followed_user",
            ActivityKind::StartedBook => "started_book",
            ActivityKind::FinishedBook => "finished_book",
            ActivityKind::WantToRead => "want_to_read",
            ActivityKind::RatedBook => "rated_book",
            ActivityKind::AddedReview => "added_review",
            ActivityKind::ReviewedBook => "reviewed_book",
            ActivityKind::Other(name) => name,
        }
    }

    /// Review activities duplicate entries of the review stream.
    pub fn is_review(&self) -> bool {
        matches!(self, ActivityKind::AddedReview | ActivityKind::ReviewedBook)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ActivityPayload {
    fn decode(activity_type: String, data: Value) -> Self {
        fn book(data: &Value) -> Option<BookActivity> {
            serde_json::from_value(data.clone()).ok()
        }

        let decoded = match ActivityKind::from_name(&activity_type) {
            ActivityKind::FollowedUser => serde_json::from_value(data.clone())
                .ok()
                .map(ActivityPayload::FollowedUser),
            ActivityKind::StartedBook => book(&data).map(ActivityPayload::StartedBook),
            ActivityKind::FinishedBook => book(&data).map(ActivityPayload::FinishedBook),
            ActivityKind::WantToRead => book(&data).map(ActivityPayload::WantToRead),
            ActivityKind::RatedBook => book(&data).and_then(|book| {
                let rating = book.rating?;
                Some(ActivityPayload::RatedBook { book, rating })
            }),
            ActivityKind::AddedReview => book(&data).map(ActivityPayload::AddedReview),
            ActivityKind::ReviewedBook => book(&data).map(ActivityPayload::ReviewedBook),
            ActivityKind::Other(_) => None,
        };

        decoded.unwrap_or(ActivityPayload::Other {
            activity_type,
            data,
        })
    }

    fn encode(self) -> (String, Value) {
        let kind = self.kind();
        let data = match self {
            ActivityPayload::FollowedUser(follow) => serde_json::to_value(follow),
            ActivityPayload::StartedBook(book)
            | ActivityPayload::FinishedBook(book)
            | ActivityPayload::WantToRead(book)
            | ActivityPayload::AddedReview(book)
            | ActivityPayload::ReviewedBook(book) => serde_json::to_value(book),
            ActivityPayload::RatedBook { mut book, rating } => {
                book.rating = Some(rating);
                serde_json::to_value(book)
            }
            ActivityPayload::Other {
                activity_type,
                data,
            } => return (activity_type, data),
        };
        (kind.as_str().to_string(), data.unwrap_or(Value::Null))
    }

    pub fn kind(&self) -> ActivityKind {
        match self {
            ActivityPayload::FollowedUser(_) => ActivityKind::FollowedUser,
            ActivityPayload::StartedBook(_) => ActivityKind::StartedBook,
            ActivityPayload::FinishedBook(_) => ActivityKind::FinishedBook,
            ActivityPayload::WantToRead(_) => ActivityKind::WantToRead,
            ActivityPayload::RatedBook { .. } => ActivityKind::RatedBook,
            ActivityPayload::AddedReview(_) => ActivityKind::AddedReview,
            ActivityPayload::ReviewedBook(_) => ActivityKind::ReviewedBook,
            ActivityPayload::Other { activity_type, .. } => {
                ActivityKind::from_name(activity_type)
            }
        }
    }

    pub fn book(&self) -> Option<&BookActivity> {
        match self {
            ActivityPayload::StartedBook(book)
            | ActivityPayload::FinishedBook(book)
            | ActivityPayload::WantToRead(book)
            | ActivityPayload::AddedReview(book)
            | ActivityPayload::ReviewedBook(book)
            | ActivityPayload::RatedBook { book, .. } => Some(book),
            ActivityPayload::FollowedUser(_) | ActivityPayload::Other { .. } => None,
        }
    }
}

/// A single entry of the activity stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawActivityEvent", into = "RawActivityEvent")]
pub struct ActivityEvent {
    pub id: ActivityId,
    pub user: UserSummary,
    pub payload: ActivityPayload,
    pub created_at: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn kind(&self) -> ActivityKind {
        self.payload.kind()
    }
}

#[derive(Serialize, Deserialize)]
struct RawActivityEvent {
    id: ActivityId,
    user: UserSummary,
    activity_type: String,
    #[serde(default)]
    activity_data: Value,
    #[serde(with = "crate::timestamp")]
    created_at: DateTime<Utc>,
}

impl From<RawActivityEvent> for ActivityEvent {
    fn from(raw: RawActivityEvent) -> Self {
        ActivityEvent {
            id: raw.id,
            user: raw.user,
            payload: ActivityPayload::decode(raw.activity_type, raw.activity_data),
            created_at: raw.created_at,
        }
    }
}

impl From<ActivityEvent> for RawActivityEvent {
    fn from(event: ActivityEvent) -> Self {
        let (activity_type, activity_data) = event.payload.encode();
        RawActivityEvent {
            id: event.id,
            user: event.user,
            activity_type,
            activity_data,
            created_at: event.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(activity_type: &str, data: Value) -> ActivityEvent {
        serde_json::from_value(json!({
            "id": 1,
            "user": { "id": 9, "name": "Ada" },
            "activity_type": activity_type,
            "activity_data": data,
            "created_at": "2024-05-01T08:00:00"
        }))
        .unwrap()
    }

    #[test]
    fn decodes_book_activity() {
        let finished = event(
            "finished_book",
            json!({ "book_id": 3, "book_title": "Dune", "book_author": "Frank Herbert", "status": "finished" }),
        );
        match &finished.payload {
            ActivityPayload::FinishedBook(book) => {
                assert_eq!(book.book_id, BookId(3));
                assert_eq!(book.book_title, "Dune");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
        assert_eq!(finished.kind(), ActivityKind::FinishedBook);
    }

    #[test]
    fn rated_book_requires_rating() {
        let rated = event(
            "rated_book",
            json!({ "book_id": 3, "book_title": "Dune", "book_author": "Frank Herbert", "rating": 4 }),
        );
        assert!(matches!(rated.payload, ActivityPayload::RatedBook { rating: 4, .. }));

        let unrated = event(
            "rated_book",
            json!({ "book_id": 3, "book_title": "Dune", "book_author": "Frank Herbert" }),
        );
        assert!(matches!(unrated.payload, ActivityPayload::Other { .. }));
        // Still groups under its declared type.
        assert_eq!(unrated.kind(), ActivityKind::RatedBook);
    }

    #[test]
    fn unknown_types_survive_a_round_trip() {
        let joined = event("joined_club", json!({ "club": "sci-fi" }));
        assert_eq!(joined.kind(), ActivityKind::Other("joined_club".into()));

        let value = serde_json::to_value(&joined).unwrap();
        assert_eq!(value["activity_type"], "joined_club");
        assert_eq!(value["activity_data"]["club"], "sci-fi");
    }

    #[test]
    fn review_kinds() {
        assert!(ActivityKind::ReviewedBook.is_review());
        assert!(ActivityKind::AddedReview.is_review());
        assert!(!ActivityKind::FinishedBook.is_review());
    }
}
