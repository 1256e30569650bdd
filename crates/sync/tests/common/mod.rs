#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bookshelf_client::{ApiError, BackendApi, Result};
use bookshelf_sync::{Notice, Notifier, Severity};
use bookshelf_types::{
    ActivityEvent, ActivityId, ActivityPayload, Book, BookActivity, BookDetails, BookId,
    BookSearchResult, NewBook, NewReading, ProfileUpdate, Reading, ReadingId, ReadingStatus,
    ReadingUpdate, Recommendation, RecommendationId, SocialFeedPage, UserId, UserSummary,
};
use chrono::{DateTime, TimeZone, Utc};

pub const USER: UserId = UserId(1);

/// In-memory backend that counts calls and fails on request.
pub struct MockBackend {
    calls: Mutex<HashMap<&'static str, usize>>,
    failures: Mutex<HashMap<&'static str, VecDeque<ApiError>>>,
    delay: Option<Duration>,
    next_id: AtomicI64,
    created: Mutex<Vec<NewReading>>,
    feed: Mutex<Vec<SocialFeedPage>>,
    feed_offsets: Mutex<Vec<u32>>,
    readings: Mutex<Vec<Reading>>,
    recommendations: Mutex<Vec<Recommendation>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            delay: None,
            next_id: AtomicI64::new(100),
            created: Mutex::new(Vec::new()),
            feed: Mutex::new(Vec::new()),
            feed_offsets: Mutex::new(Vec::new()),
            readings: Mutex::new(Vec::new()),
            recommendations: Mutex::new(Vec::new()),
        }
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_readings(self, readings: Vec<Reading>) -> Self {
        *self.readings.lock().unwrap() = readings;
        self
    }

    pub fn with_recommendations(self, recommendations: Vec<Recommendation>) -> Self {
        *self.recommendations.lock().unwrap() = recommendations;
        self
    }

    /// Pages served by `social_feed`, indexed by `offset / limit`.
    pub fn with_feed(self, pages: Vec<SocialFeedPage>) -> Self {
        *self.feed.lock().unwrap() = pages;
        self
    }

    /// Make the next call of `method` fail with `error`.
    pub fn fail_next(&self, method: &'static str, error: ApiError) {
        self.failures
            .lock()
            .unwrap()
            .entry(method)
            .or_default()
            .push_back(error);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn created_readings(&self) -> Vec<NewReading> {
        self.created.lock().unwrap().clone()
    }

    pub fn feed_offsets(&self) -> Vec<u32> {
        self.feed_offsets.lock().unwrap().clone()
    }

    async fn enter(&self, method: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(method).or_default() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(|queue| queue.pop_front());
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn add_book(&self, new: &NewBook) -> Result<Book> {
        self.enter("add_book").await?;
        Ok(Book {
            id: BookId(self.next_id()),
            details: new.details.clone(),
            open_library_id: new.open_library_id.clone(),
            created_at: at(0),
        })
    }

    async fn search_books(&self, query: &str, _limit: u32) -> Result<Vec<BookSearchResult>> {
        self.enter("search_books").await?;
        Ok(vec![search_result(query, "Someone")])
    }

    async fn create_reading(&self, user_id: UserId, new: &NewReading) -> Result<Reading> {
        self.enter("create_reading").await?;
        self.created.lock().unwrap().push(new.clone());
        let mut created = reading(self.next_id(), new.book_id, new.status);
        created.user_id = user_id;
        Ok(created)
    }

    async fn update_reading(&self, id: ReadingId, update: &ReadingUpdate) -> Result<Reading> {
        self.enter("update_reading").await?;
        let mut updated = reading(id.get(), BookId(1), ReadingStatus::WantToRead);
        if let Some(status) = update.status {
            updated.status = status;
        }
        updated.rating = update.rating;
        Ok(updated)
    }

    async fn delete_reading(&self, _id: ReadingId) -> Result<()> {
        self.enter("delete_reading").await
    }

    async fn list_readings(
        &self,
        _user_id: UserId,
        status: Option<ReadingStatus>,
    ) -> Result<Vec<Reading>> {
        self.enter("list_readings").await?;
        Ok(self
            .readings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect())
    }

    async fn list_recommendations(&self) -> Result<Vec<Recommendation>> {
        self.enter("list_recommendations").await?;
        Ok(self.recommendations.lock().unwrap().clone())
    }

    async fn dismiss_recommendation(&self, _id: RecommendationId) -> Result<()> {
        self.enter("dismiss_recommendation").await
    }

    async fn social_feed(&self, limit: u32, offset: u32) -> Result<SocialFeedPage> {
        self.feed_offsets.lock().unwrap().push(offset);
        self.enter("social_feed").await?;
        let index = (offset / limit.max(1)) as usize;
        Ok(self
            .feed
            .lock()
            .unwrap()
            .get(index)
            .cloned()
            .unwrap_or_default())
    }

    async fn follow_user(&self, _user_id: UserId) -> Result<()> {
        self.enter("follow_user").await
    }

    async fn unfollow_user(&self, _user_id: UserId) -> Result<()> {
        self.enter("unfollow_user").await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserSummary> {
        self.enter("update_profile").await?;
        let mut me = user(USER.get());
        if let Some(name) = &update.name {
            me.name = name.clone();
        }
        Ok(me)
    }
}

/// Keeps every notice for inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|notice| notice.severity == Severity::Error)
            .map(|notice| notice.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// === Fixtures ===

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
}

pub fn user(id: i64) -> UserSummary {
    UserSummary {
        id: UserId(id),
        name: format!("User {id}"),
        username: Some(format!("user{id}")),
        profile_picture_url: None,
        is_following: None,
    }
}

pub fn book(id: i64, title: &str, author: &str) -> Book {
    Book {
        id: BookId(id),
        details: BookDetails::new(title, author),
        open_library_id: None,
        created_at: at(0),
    }
}

pub fn search_result(title: &str, author: &str) -> BookSearchResult {
    BookSearchResult {
        title: title.into(),
        author: author.into(),
        isbn: None,
        cover_url: None,
        description: None,
        publication_year: None,
        open_library_key: None,
    }
}

pub fn reading(id: i64, book_id: BookId, status: ReadingStatus) -> Reading {
    Reading {
        id: ReadingId(id),
        user_id: USER,
        book_id,
        status,
        rating: None,
        review: None,
        is_review_public: None,
        progress_pages: 0,
        total_pages: None,
        started_at: None,
        finished_at: None,
        created_at: at(0),
        updated_at: at(0),
        book: None,
        user: None,
        like_count: None,
        comment_count: None,
        is_liked: None,
    }
}

/// A reading with its book embedded, as the readings listing returns it.
pub fn library_entry(id: i64, book: Book) -> Reading {
    let mut entry = reading(id, book.id, ReadingStatus::CurrentlyReading);
    entry.book = Some(book);
    entry
}

pub fn recommendation(id: i64, book: Book) -> Recommendation {
    Recommendation {
        id: RecommendationId(id),
        user_id: USER,
        book_id: book.id,
        reason: "Because you liked Dune".into(),
        confidence_score: 0.8,
        is_dismissed: false,
        created_at: at(0),
        book,
    }
}

pub fn review(id: i64, user_id: i64, hour: u32) -> Reading {
    let mut entry = reading(id, BookId(id), ReadingStatus::Finished);
    entry.user_id = UserId(user_id);
    entry.user = Some(user(user_id));
    entry.rating = Some(5);
    entry.review = Some("A classic".into());
    entry.is_review_public = Some(true);
    entry.updated_at = at(hour);
    entry
}

pub fn book_activity(book_id: i64) -> BookActivity {
    BookActivity {
        book_id: BookId(book_id),
        book_title: format!("Book {book_id}"),
        book_author: "Author".into(),
        book_cover_url: None,
        rating: None,
        reading_id: None,
        has_review: None,
    }
}

pub fn activity(id: i64, user_id: i64, payload: ActivityPayload, hour: u32) -> ActivityEvent {
    ActivityEvent {
        id: ActivityId(id),
        user: user(user_id),
        payload,
        created_at: at(hour),
    }
}
