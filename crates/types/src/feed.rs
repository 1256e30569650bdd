//! Social feed page payload and the client-side merged feed entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityEvent, ActivityKind};
use crate::reading::Reading;
use crate::user::UserSummary;

/// Response of `GET /social/feed`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SocialFeedPage {
    #[serde(default)]
    pub activities: Vec<ActivityEvent>,
    #[serde(default)]
    pub recent_reviews: Vec<Reading>,
}

impl SocialFeedPage {
    /// Combined number of entries of both streams.
    pub fn len(&self) -> usize {
        self.activities.len() + self.recent_reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Activities sharing one (user, activity type) pair.
///
/// `activities` is ordered newest first and `latest` is the newest member's
/// timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedActivity {
    pub user: UserSummary,
    pub kind: ActivityKind,
    pub activities: Vec<ActivityEvent>,
    pub latest: DateTime<Utc>,
}

impl GroupedActivity {
    /// The member shown when the group is collapsed.
    pub fn head(&self) -> Option<&ActivityEvent> {
        self.activities.first()
    }

    /// Members behind the expand action.
    pub fn rest(&self) -> &[ActivityEvent] {
        self.activities.get(1..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedItem {
    Review(Reading),
    GroupedActivity(GroupedActivity),
}

impl FeedItem {
    /// Sort key: a review's `updated_at`, a group's newest member.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            FeedItem::Review(reading) => reading.updated_at,
            FeedItem::GroupedActivity(group) => group.latest,
        }
    }
}
