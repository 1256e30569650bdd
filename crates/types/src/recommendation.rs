use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::ids::{BookId, RecommendationId, UserId};

/// A generated book suggestion.
///
/// A recommendation ends either by dismissal or by conversion into a reading;
/// conversion dismisses it as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: RecommendationId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub reason: String,
    #[serde(alias = "score")]
    pub confidence_score: f64,
    #[serde(default)]
    pub is_dismissed: bool,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    pub book: Book,
}

impl Recommendation {
    /// Confidence clamped to `0.0..=1.0`; generated scores occasionally overshoot.
    pub fn confidence(&self) -> f64 {
        self.confidence_score.clamp(0.0, 1.0)
    }
}
