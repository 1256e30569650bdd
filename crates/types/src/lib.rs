//! Shared data model for the Bookshelf client.
//!
//! These types mirror the JSON shapes served by the Bookshelf backend:
//! books, per-user readings, recommendations and the social activity stream.
//! Derived, client-only types (such as [`FeedItem`]) live here as well so the
//! sync core and any host share one vocabulary.

pub mod activity;
pub mod book;
pub mod feed;
pub mod ids;
pub mod reading;
pub mod recommendation;
pub mod timestamp;
pub mod user;

pub use activity::{ActivityEvent, ActivityKind, ActivityPayload, BookActivity, FollowActivity};
pub use book::{Book, BookDetails, BookSearchResult, NewBook};
pub use feed::{FeedItem, GroupedActivity, SocialFeedPage};
pub use ids::{ActivityId, BookId, ReadingId, RecommendationId, UserId};
pub use reading::{InvalidUpdate, NewReading, Reading, ReadingStatus, ReadingUpdate};
pub use recommendation::Recommendation;
pub use user::{ProfileUpdate, UserSummary};
