mod common;

use std::sync::Arc;
use std::time::Duration;

use bookshelf_client::ApiError;
use bookshelf_sync::{FeedAggregator, InvalidationBus, PageOutcome, SocialActions, View};
use bookshelf_types::{ActivityPayload, FeedItem, SocialFeedPage, UserId};

use common::*;

fn full_page(first_id: i64, size: i64, hour: u32) -> SocialFeedPage {
    SocialFeedPage {
        activities: (first_id..first_id + size)
            .map(|id| activity(id, id, ActivityPayload::StartedBook(book_activity(id)), hour))
            .collect(),
        recent_reviews: Vec::new(),
    }
}

#[tokio::test]
async fn pages_accumulate_until_a_short_page() {
    init_tracing();
    let backend = Arc::new(MockBackend::new().with_feed(vec![
        full_page(1, 3, 10),
        SocialFeedPage {
            activities: vec![activity(50, 2, ActivityPayload::WantToRead(book_activity(8)), 4)],
            recent_reviews: vec![review(60, 3, 6)],
        },
    ]));
    let feed = FeedAggregator::new(backend.clone(), 3);

    assert_eq!(
        feed.fetch_next_page().await.unwrap(),
        PageOutcome::Loaded {
            entries: 3,
            has_more: true
        }
    );
    assert_eq!(
        feed.fetch_next_page().await.unwrap(),
        PageOutcome::Loaded {
            entries: 2,
            has_more: false
        }
    );
    assert_eq!(feed.fetch_next_page().await.unwrap(), PageOutcome::Exhausted);

    // Exhaustion is local: no request for a third page.
    assert_eq!(backend.feed_offsets(), vec![0, 3]);
    assert_eq!(feed.pages_fetched().await, 2);

    let items = feed.items().await;
    assert_eq!(items.len(), 5);
    assert!(items.windows(2).all(|w| w[0].timestamp() >= w[1].timestamp()));
    assert!(matches!(items[3], FeedItem::Review(_)));
}

#[tokio::test]
async fn failed_pages_can_be_retried() {
    let backend = Arc::new(MockBackend::new().with_feed(vec![full_page(1, 2, 10)]));
    backend.fail_next("social_feed", ApiError::transport("timed out"));
    let feed = FeedAggregator::new(backend.clone(), 2);

    assert!(feed.fetch_next_page().await.is_err());
    assert!(!feed.is_loading());
    assert_eq!(feed.pages_fetched().await, 0);

    feed.fetch_next_page().await.unwrap();
    assert_eq!(backend.feed_offsets(), vec![0, 0]);
    assert_eq!(feed.items().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn one_fetch_at_a_time() {
    let backend = Arc::new(
        MockBackend::new()
            .with_feed(vec![full_page(1, 2, 10)])
            .with_delay(Duration::from_millis(30)),
    );
    let feed = FeedAggregator::new(backend.clone(), 2);

    let (first, second) = tokio::join!(feed.fetch_next_page(), feed.fetch_next_page());

    assert!(matches!(first.unwrap(), PageOutcome::Loaded { .. }));
    assert_eq!(second.unwrap(), PageOutcome::AlreadyLoading);
    assert_eq!(backend.calls("social_feed"), 1);
}

#[tokio::test(start_paused = true)]
async fn pages_resolving_after_a_reset_are_discarded() {
    let backend = Arc::new(
        MockBackend::new()
            .with_feed(vec![full_page(1, 2, 10)])
            .with_delay(Duration::from_millis(30)),
    );
    let feed = FeedAggregator::new(backend.clone(), 2);

    let (fetched, ()) = tokio::join!(feed.fetch_next_page(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        feed.reset().await;
    });

    assert_eq!(fetched.unwrap(), PageOutcome::Discarded);
    assert!(feed.items().await.is_empty());
    assert_eq!(feed.pages_fetched().await, 0);
}

#[tokio::test]
async fn following_someone_restarts_the_feed() {
    let backend = Arc::new(
        MockBackend::new().with_feed(vec![full_page(1, 2, 10), full_page(3, 2, 8)]),
    );
    let bus = Arc::new(InvalidationBus::new());
    let feed = FeedAggregator::new(backend.clone(), 2).with_bus(bus.clone());
    let social = SocialActions::new(backend.clone(), bus.clone());

    feed.fetch_next_page().await.unwrap();
    feed.fetch_next_page().await.unwrap();
    assert_eq!(feed.items().await.len(), 4);

    social.follow_user(UserId(42)).await.unwrap();
    feed.fetch_next_page().await.unwrap();

    // Restarted from the first page instead of appending a third.
    assert_eq!(backend.feed_offsets(), vec![0, 2, 0]);
    assert_eq!(feed.pages_fetched().await, 1);
    assert_eq!(feed.items().await.len(), 2);
}

#[tokio::test]
async fn unfollowing_clears_loaded_items_before_the_next_fetch() {
    let backend = Arc::new(MockBackend::new().with_feed(vec![full_page(1, 2, 10)]));
    let bus = Arc::new(InvalidationBus::new());
    let feed = FeedAggregator::new(backend.clone(), 2).with_bus(bus.clone());
    let social = SocialActions::new(backend.clone(), bus.clone());

    feed.fetch_next_page().await.unwrap();
    assert_eq!(feed.items().await.len(), 2);

    social.unfollow_user(UserId(42)).await.unwrap();

    assert!(feed.items().await.is_empty());
    assert_eq!(feed.pages_fetched().await, 0);
    assert!(feed.has_more().await);
    assert!(!bus.is_stale(View::SocialFeed));
    assert_eq!(backend.feed_offsets(), vec![0]);
}
