//! Library mutations spanning several backend calls.
//!
//! Adding a book is "ensure the book exists, then create the reading";
//! converting a recommendation additionally dismisses it. The steps of one
//! mutation run strictly in order. Mutations on different entities run
//! independently, while a second mutation on an entity that still has one
//! pending is rejected with [`MutationError::InFlight`].
//!
//! Explicit "add to library" actions get a single attempt so a double click
//! can never turn into two silent submissions. Recommendation conversion is
//! retried (two attempts by default) and resumes from the first step that has
//! not succeeded yet.

use std::sync::Arc;

use bookshelf_client::{ApiError, BackendApi};
use bookshelf_types::{
    Book, BookSearchResult, NewBook, NewReading, Reading, ReadingId, ReadingStatus, ReadingUpdate,
    Recommendation, RecommendationId, UserId,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::error::{MutationError, Result};
use crate::identity::{BookRef, LibraryIndex};
use crate::inflight::{EntityKey, InFlight, InFlightKind};
use crate::invalidation::{InvalidationBus, Mutation, View};
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::retry::RetryPolicy;

/// Where a book to be added comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum BookSource {
    /// Already persisted; the ensure-book step is skipped.
    Persisted(Book),
    /// A catalogue search hit without an id.
    Search(BookSearchResult),
    /// Metadata entered by hand.
    Draft(NewBook),
}

impl BookSource {
    pub fn book_ref(&self) -> BookRef {
        match self {
            BookSource::Persisted(book) => BookRef::from(book),
            BookSource::Search(result) => BookRef::from(result),
            BookSource::Draft(book) => BookRef::from(book),
        }
    }

    fn new_book(&self) -> NewBook {
        match self {
            BookSource::Persisted(book) => book.to_new_book(),
            BookSource::Search(result) => NewBook::from(result),
            BookSource::Draft(book) => book.clone(),
        }
    }

    fn title(&self) -> &str {
        match self {
            BookSource::Persisted(book) => book.title(),
            BookSource::Search(result) => &result.title,
            BookSource::Draft(book) => &book.details.title,
        }
    }
}

impl From<Book> for BookSource {
    fn from(book: Book) -> Self {
        BookSource::Persisted(book)
    }
}

impl From<BookSearchResult> for BookSource {
    fn from(result: BookSearchResult) -> Self {
        BookSource::Search(result)
    }
}

impl From<NewBook> for BookSource {
    fn from(book: NewBook) -> Self {
        BookSource::Draft(book)
    }
}

/// Result of adding a book to the library.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryAddition {
    pub book: Book,
    pub reading: Reading,
}

/// Result of converting a recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub book: Book,
    pub reading: Reading,
    pub recommendation_id: RecommendationId,
}

/// Steps of a conversion that already succeeded, kept across attempts.
#[derive(Debug, Default)]
struct ConversionProgress {
    book: Option<Book>,
    reading: Option<Reading>,
    dismissed: bool,
}

pub struct LibraryOrchestrator {
    backend: Arc<dyn BackendApi>,
    user_id: UserId,
    config: SyncConfig,
    in_flight: InFlight,
    recommendations: RwLock<Vec<Recommendation>>,
    bus: Arc<InvalidationBus>,
    notifier: Arc<dyn Notifier>,
}

impl LibraryOrchestrator {
    pub fn new(backend: Arc<dyn BackendApi>, user_id: UserId, bus: Arc<InvalidationBus>) -> Self {
        Self {
            backend,
            user_id,
            config: SyncConfig::default(),
            in_flight: InFlight::new(),
            recommendations: RwLock::new(Vec::new()),
            bus,
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn bus(&self) -> &Arc<InvalidationBus> {
        &self.bus
    }

    // === In-flight state ===

    pub fn is_in_flight(&self, key: &EntityKey) -> bool {
        self.in_flight.is_in_flight(key)
    }

    pub fn is_adding(&self, id: RecommendationId) -> bool {
        self.in_flight.kind_of(&EntityKey::Recommendation(id)) == Some(InFlightKind::Adding)
    }

    pub fn is_dismissing(&self, id: RecommendationId) -> bool {
        self.in_flight.kind_of(&EntityKey::Recommendation(id)) == Some(InFlightKind::Dismissing)
    }

    // === Reads ===

    /// Fetch the user's readings and index them.
    pub async fn load_library(&self) -> bookshelf_client::Result<LibraryIndex> {
        let readings = self.backend.list_readings(self.user_id, None).await?;
        self.bus.take_stale(View::Readings);
        debug!("Loaded {} readings for user {}", readings.len(), self.user_id);
        Ok(LibraryIndex::from_readings(readings))
    }

    /// Replace the cached recommendation list with the backend's.
    pub async fn refresh_recommendations(&self) -> bookshelf_client::Result<Vec<Recommendation>> {
        let fetched = self.backend.list_recommendations().await?;
        self.bus.take_stale(View::Recommendations);
        self.set_recommendations(fetched.clone()).await;
        Ok(fetched)
    }

    pub async fn set_recommendations(&self, recommendations: Vec<Recommendation>) {
        *self.recommendations.write().await = recommendations
            .into_iter()
            .filter(|recommendation| !recommendation.is_dismissed)
            .collect();
    }

    pub async fn recommendations(&self) -> Vec<Recommendation> {
        self.recommendations.read().await.clone()
    }

    pub async fn recommendation(&self, id: RecommendationId) -> Option<Recommendation> {
        self.recommendations
            .read()
            .await
            .iter()
            .find(|recommendation| recommendation.id == id)
            .cloned()
    }

    // === Mutations ===

    /// Add a book to the library with `status` (or the configured default).
    ///
    /// Fails with [`MutationError::AlreadyInLibrary`] without calling the
    /// backend when `library` already holds the book.
    pub async fn add_to_library(
        &self,
        source: impl Into<BookSource>,
        status: Option<ReadingStatus>,
        library: &LibraryIndex,
    ) -> Result<LibraryAddition> {
        let source = source.into();
        let book_ref = source.book_ref();

        if let Some(existing) = library.resolve(&book_ref) {
            debug!(
                "Book {:?} already in library as reading {}",
                book_ref.title, existing.id
            );
            return Err(self.fail(MutationError::AlreadyInLibrary { source: None }));
        }

        let key = match (book_ref.id, book_ref.identity()) {
            (Some(id), _) => EntityKey::Book(id),
            (None, Some(identity)) => EntityKey::Provisional(identity),
            (None, None) => return Err(self.fail(MutationError::MissingIdentity)),
        };
        let _guard = self
            .in_flight
            .try_begin(key.clone(), InFlightKind::Adding)
            .ok_or(MutationError::InFlight(key))?;

        let status = status.unwrap_or(self.config.default_status);
        let policy = RetryPolicy::new(self.config.direct_add_attempts)
            .with_base_delay(self.config.base_delay());

        let added = policy
            .run_if(|| self.add_steps(&source, status), ApiError::is_retryable)
            .await
            .map_err(|e| self.fail(MutationError::from_api(e.last, e.attempts)))?;

        self.bus.record_success(Mutation::CreateReading);
        info!(
            "Added book {} to library of user {} as {}",
            added.book.id, self.user_id, status
        );
        self.notifier
            .notify(Notice::info(format!("Added \"{}\" to your library", source.title())));
        Ok(added)
    }

    async fn add_steps(
        &self,
        source: &BookSource,
        status: ReadingStatus,
    ) -> std::result::Result<LibraryAddition, ApiError> {
        let book = match source {
            BookSource::Persisted(book) => book.clone(),
            other => self.backend.add_book(&other.new_book()).await?,
        };
        let reading = self
            .backend
            .create_reading(self.user_id, &NewReading::new(book.id, status))
            .await?;
        Ok(LibraryAddition { book, reading })
    }

    /// Turn a recommendation into a library entry with `status` (or the
    /// configured default) and dismiss it.
    ///
    /// Fails with [`MutationError::AlreadyInLibrary`] without calling the
    /// backend when `library` already holds the recommended book.
    pub async fn add_from_recommendation(
        &self,
        recommendation: &Recommendation,
        status: Option<ReadingStatus>,
        library: &LibraryIndex,
    ) -> Result<Conversion> {
        if let Some(existing) = library.resolve(&BookRef::from(recommendation)) {
            debug!(
                "Recommendation {} points at book already in library as reading {}",
                recommendation.id, existing.id
            );
            return Err(self.fail(MutationError::AlreadyInLibrary { source: None }));
        }

        let key = EntityKey::Recommendation(recommendation.id);
        let _guard = self
            .in_flight
            .try_begin(key.clone(), InFlightKind::Adding)
            .ok_or(MutationError::InFlight(key))?;

        let status = status.unwrap_or(self.config.default_status);
        let progress = Mutex::new(ConversionProgress::default());
        let policy = RetryPolicy::new(self.config.recommendation_attempts)
            .with_base_delay(self.config.base_delay());

        let conversion = policy
            .run_if(
                || self.conversion_steps(recommendation, status, &progress),
                ApiError::is_retryable,
            )
            .await
            .map_err(|e| self.fail(MutationError::from_api(e.last, e.attempts)))?;

        self.remove_cached(recommendation.id).await;
        self.bus.record_success(Mutation::AddFromRecommendation);
        info!(
            "Converted recommendation {} into reading {}",
            recommendation.id, conversion.reading.id
        );
        self.notifier.notify(Notice::info(format!(
            "Added \"{}\" to your library",
            recommendation.book.title()
        )));
        Ok(conversion)
    }

    async fn conversion_steps(
        &self,
        recommendation: &Recommendation,
        status: ReadingStatus,
        progress: &Mutex<ConversionProgress>,
    ) -> std::result::Result<Conversion, ApiError> {
        let mut progress = progress.lock().await;

        let book = match &progress.book {
            Some(book) => book.clone(),
            None => {
                let book = self
                    .backend
                    .add_book(&recommendation.book.to_new_book())
                    .await?;
                progress.book = Some(book.clone());
                book
            }
        };

        let reading = match &progress.reading {
            Some(reading) => reading.clone(),
            None => {
                let reading = self
                    .backend
                    .create_reading(self.user_id, &NewReading::new(book.id, status))
                    .await?;
                progress.reading = Some(reading.clone());
                reading
            }
        };

        if !progress.dismissed {
            self.backend
                .dismiss_recommendation(recommendation.id)
                .await?;
            progress.dismissed = true;
        }

        Ok(Conversion {
            book,
            reading,
            recommendation_id: recommendation.id,
        })
    }

    /// Dismiss a recommendation without adding it.
    pub async fn dismiss_recommendation(&self, id: RecommendationId) -> Result<()> {
        let key = EntityKey::Recommendation(id);
        let _guard = self
            .in_flight
            .try_begin(key.clone(), InFlightKind::Dismissing)
            .ok_or(MutationError::InFlight(key))?;

        self.backend
            .dismiss_recommendation(id)
            .await
            .map_err(|e| self.fail(MutationError::from_backend(e, 1)))?;

        self.remove_cached(id).await;
        self.bus.record_success(Mutation::DismissRecommendation);
        info!("Dismissed recommendation {}", id);
        Ok(())
    }

    pub async fn update_reading(&self, id: ReadingId, update: &ReadingUpdate) -> Result<Reading> {
        update
            .validate()
            .map_err(|e| self.fail(MutationError::InvalidUpdate(e)))?;

        let key = EntityKey::Reading(id);
        let _guard = self
            .in_flight
            .try_begin(key.clone(), InFlightKind::Updating)
            .ok_or(MutationError::InFlight(key))?;

        let reading = self
            .backend
            .update_reading(id, update)
            .await
            .map_err(|e| self.fail(MutationError::from_backend(e, 1)))?;

        self.bus.record_success(Mutation::UpdateReading);
        info!("Updated reading {}", id);
        Ok(reading)
    }

    pub async fn delete_reading(&self, id: ReadingId) -> Result<()> {
        let key = EntityKey::Reading(id);
        let _guard = self
            .in_flight
            .try_begin(key.clone(), InFlightKind::Deleting)
            .ok_or(MutationError::InFlight(key))?;

        self.backend
            .delete_reading(id)
            .await
            .map_err(|e| self.fail(MutationError::from_backend(e, 1)))?;

        self.bus.record_success(Mutation::DeleteReading);
        info!("Deleted reading {}", id);
        Ok(())
    }

    async fn remove_cached(&self, id: RecommendationId) {
        self.recommendations
            .write()
            .await
            .retain(|recommendation| recommendation.id != id);
    }

    /// Emit the one user-facing notice for a terminal failure.
    fn fail(&self, error: MutationError) -> MutationError {
        if !error.is_suppressed() {
            self.notifier.notify(Notice::error(error.user_message()));
        }
        error
    }
}
