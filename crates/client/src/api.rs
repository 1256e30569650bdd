use async_trait::async_trait;

use bookshelf_types::{
    Book, BookSearchResult, NewBook, NewReading, ProfileUpdate, Reading, ReadingId, ReadingStatus,
    ReadingUpdate, Recommendation, RecommendationId, SocialFeedPage, UserId, UserSummary,
};

use crate::error::Result;

/// The subset of the Bookshelf REST API the sync core relies on.
///
/// Every method is a single request; retries and sequencing belong to callers.
#[async_trait]
pub trait BackendApi: Send + Sync {
    // === Books ===

    /// `POST /books`: add a book, or return the existing one with the same
    /// natural key.
    async fn add_book(&self, book: &NewBook) -> Result<Book>;

    /// `GET /books/search?q=&limit=`
    async fn search_books(&self, query: &str, limit: u32) -> Result<Vec<BookSearchResult>>;

    // === Readings ===

    /// `POST /readings?user_id=`
    async fn create_reading(&self, user_id: UserId, reading: &NewReading) -> Result<Reading>;

    /// `PUT /readings/{id}`
    async fn update_reading(&self, id: ReadingId, update: &ReadingUpdate) -> Result<Reading>;

    /// `DELETE /readings/{id}`
    async fn delete_reading(&self, id: ReadingId) -> Result<()>;

    /// `GET /readings/user/{id}?status=`
    async fn list_readings(
        &self,
        user_id: UserId,
        status: Option<ReadingStatus>,
    ) -> Result<Vec<Reading>>;

    // === Recommendations ===

    /// `GET /recommendations`
    async fn list_recommendations(&self) -> Result<Vec<Recommendation>>;

    /// `PUT /recommendations/{id}/dismiss`
    async fn dismiss_recommendation(&self, id: RecommendationId) -> Result<()>;

    // === Social ===

    /// `GET /social/feed?limit=&offset=`
    async fn social_feed(&self, limit: u32, offset: u32) -> Result<SocialFeedPage>;

    /// `POST /social/follow`
    async fn follow_user(&self, user_id: UserId) -> Result<()>;

    /// `DELETE /social/unfollow/{id}`
    async fn unfollow_user(&self, user_id: UserId) -> Result<()>;

    /// `PUT /users/me`
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserSummary>;
}
