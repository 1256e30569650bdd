//! Merged social timeline.
//!
//! The backend serves reviews and activity events together, one offset page
//! at a time. Every fetched page is appended to an accumulator and the
//! timeline is rebuilt from the whole accumulator: review-type activities
//! are dropped (the review stream already carries them), the rest are
//! grouped by `(user, activity type)`, and reviews and groups are sorted
//! newest first.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bookshelf_client::BackendApi;
use bookshelf_types::{
    ActivityEvent, ActivityId, ActivityKind, FeedItem, GroupedActivity, Reading, ReadingId,
    SocialFeedPage, UserId,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::invalidation::{InvalidationBus, View};

/// Build the timeline from accumulated reviews and activities.
pub fn build_feed(reviews: &[Reading], activities: &[ActivityEvent]) -> Vec<FeedItem> {
    let mut groups: Vec<GroupedActivity> = Vec::new();
    let mut positions: HashMap<(UserId, ActivityKind), usize> = HashMap::new();

    for event in activities {
        let kind = event.kind();
        if kind.is_review() {
            continue;
        }
        match positions.entry((event.user.id, kind.clone())) {
            Entry::Occupied(slot) => {
                let group = &mut groups[*slot.get()];
                group.latest = group.latest.max(event.created_at);
                group.activities.push(event.clone());
            }
            Entry::Vacant(slot) => {
                slot.insert(groups.len());
                groups.push(GroupedActivity {
                    user: event.user.clone(),
                    kind,
                    activities: vec![event.clone()],
                    latest: event.created_at,
                });
            }
        }
    }

    for group in &mut groups {
        group
            .activities
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    let mut items: Vec<FeedItem> = reviews
        .iter()
        .cloned()
        .map(FeedItem::Review)
        .chain(groups.into_iter().map(FeedItem::GroupedActivity))
        .collect();
    // Stable: ties keep reviews ahead of groups, in fetch order.
    items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    items
}

/// What a call to [`FeedAggregator::fetch_next_page`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Loaded { entries: usize, has_more: bool },
    /// The last page has already been seen.
    Exhausted,
    /// Another fetch is running.
    AlreadyLoading,
    /// The feed was reset while the page was in flight.
    Discarded,
}

#[derive(Debug)]
struct FeedState {
    pages_fetched: u32,
    reviews: Vec<Reading>,
    activities: Vec<ActivityEvent>,
    seen_reviews: HashSet<ReadingId>,
    seen_activities: HashSet<ActivityId>,
    has_more: bool,
    generation: u64,
}

impl FeedState {
    fn new(generation: u64) -> Self {
        Self {
            pages_fetched: 0,
            reviews: Vec::new(),
            activities: Vec::new(),
            seen_reviews: HashSet::new(),
            seen_activities: HashSet::new(),
            has_more: true,
            generation,
        }
    }

    /// Append a page, skipping entries an earlier page already delivered.
    fn append(&mut self, page: SocialFeedPage) -> usize {
        let mut added = 0;
        for reading in page.recent_reviews {
            if self.seen_reviews.insert(reading.id) {
                self.reviews.push(reading);
                added += 1;
            }
        }
        for event in page.activities {
            if self.seen_activities.insert(event.id) {
                self.activities.push(event);
                added += 1;
            }
        }
        added
    }
}

/// Clears the loading flag when the fetch settles or is dropped.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Paginated accumulator behind the social timeline.
pub struct FeedAggregator {
    backend: Arc<dyn BackendApi>,
    page_size: u32,
    bus: Option<Arc<InvalidationBus>>,
    loading: AtomicBool,
    state: Mutex<FeedState>,
}

impl FeedAggregator {
    pub fn new(backend: Arc<dyn BackendApi>, page_size: u32) -> Self {
        Self {
            backend,
            page_size: page_size.max(1),
            bus: None,
            loading: AtomicBool::new(false),
            state: Mutex::new(FeedState::new(0)),
        }
    }

    /// Reset the accumulator whenever the bus marks the social feed stale.
    pub fn with_bus(mut self, bus: Arc<InvalidationBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch the page after the last one fetched.
    ///
    /// A page with fewer combined entries than the page size ends the feed.
    /// This can end it early when one of the two streams runs out before
    /// the other.
    pub async fn fetch_next_page(&self) -> bookshelf_client::Result<PageOutcome> {
        self.drop_if_stale().await;

        if self.loading.swap(true, Ordering::AcqRel) {
            return Ok(PageOutcome::AlreadyLoading);
        }
        let _loading = LoadingGuard(&self.loading);

        let (offset, generation) = {
            let state = self.state.lock().await;
            if !state.has_more {
                return Ok(PageOutcome::Exhausted);
            }
            (
                state.pages_fetched.saturating_mul(self.page_size),
                state.generation,
            )
        };

        debug!("Fetching social feed at offset {}", offset);
        let page = self.backend.social_feed(self.page_size, offset).await?;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("Discarding feed page at offset {} fetched before a reset", offset);
            return Ok(PageOutcome::Discarded);
        }

        let received = page.len();
        let entries = state.append(page);
        state.pages_fetched += 1;
        state.has_more = received >= self.page_size as usize;

        info!(
            "Loaded feed page {} ({} entries, more: {})",
            state.pages_fetched, entries, state.has_more
        );
        Ok(PageOutcome::Loaded {
            entries,
            has_more: state.has_more,
        })
    }

    /// Drop every fetched page. The next fetch starts at offset zero.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        let generation = state.generation + 1;
        *state = FeedState::new(generation);
        debug!("Social feed reset");
    }

    /// Merged feed of everything loaded so far. Empty once a follow change
    /// has marked the feed stale.
    pub async fn items(&self) -> Vec<FeedItem> {
        self.drop_if_stale().await;
        let state = self.state.lock().await;
        build_feed(&state.reviews, &state.activities)
    }

    pub async fn has_more(&self) -> bool {
        self.drop_if_stale().await;
        self.state.lock().await.has_more
    }

    pub async fn pages_fetched(&self) -> u32 {
        self.drop_if_stale().await;
        self.state.lock().await.pages_fetched
    }

    async fn drop_if_stale(&self) {
        if let Some(bus) = &self.bus {
            if bus.take_stale(View::SocialFeed) {
                self.reset().await;
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }
}
