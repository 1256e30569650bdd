//! Which cached views a successful mutation makes stale.
//!
//! | Mutation                           | Invalidates                               |
//! |------------------------------------|-------------------------------------------|
//! | create/update/delete reading       | readings, dashboard                       |
//! | dismiss recommendation             | recommendations, dashboard                |
//! | add from recommendation            | readings, dashboard, recommendations      |
//! | follow/unfollow user               | user search, social feed                  |
//! | update profile                     | current user, dashboard, viewed profile   |
//!
//! Only successes are recorded. Each view of a mutation is marked once.

use std::fmt;

use bookshelf_types::UserId;
use dashmap::DashSet;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    CreateReading,
    UpdateReading,
    DeleteReading,
    DismissRecommendation,
    AddFromRecommendation,
    FollowUser,
    UnfollowUser,
    /// Profile update while `viewed_profile` is on screen.
    UpdateProfile { viewed_profile: UserId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Readings,
    Dashboard,
    Recommendations,
    UserSearch,
    SocialFeed,
    CurrentUser,
    UserProfile(UserId),
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Readings => f.write_str("readings"),
            View::Dashboard => f.write_str("dashboard"),
            View::Recommendations => f.write_str("recommendations"),
            View::UserSearch => f.write_str("user-search"),
            View::SocialFeed => f.write_str("social-feed"),
            View::CurrentUser => f.write_str("current-user"),
            View::UserProfile(id) => write!(f, "user-profile/{}", id),
        }
    }
}

impl Mutation {
    /// Views made stale by a success of this mutation.
    pub fn invalidates(&self) -> Vec<View> {
        match *self {
            Mutation::CreateReading | Mutation::UpdateReading | Mutation::DeleteReading => {
                vec![View::Readings, View::Dashboard]
            }
            Mutation::DismissRecommendation => vec![View::Recommendations, View::Dashboard],
            Mutation::AddFromRecommendation => {
                vec![View::Readings, View::Dashboard, View::Recommendations]
            }
            Mutation::FollowUser | Mutation::UnfollowUser => {
                vec![View::UserSearch, View::SocialFeed]
            }
            Mutation::UpdateProfile { viewed_profile } => vec![
                View::CurrentUser,
                View::Dashboard,
                View::UserProfile(viewed_profile),
            ],
        }
    }
}

const CHANNEL_CAPACITY: usize = 64;

/// Stale-view registry with change notifications.
///
/// Hosts either poll ([`is_stale`](Self::is_stale) / [`take_stale`](Self::take_stale))
/// or [`subscribe`](Self::subscribe) to refetch as views go stale.
#[derive(Debug)]
pub struct InvalidationBus {
    stale: DashSet<View>,
    tx: broadcast::Sender<View>,
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InvalidationBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            stale: DashSet::new(),
            tx,
        }
    }

    /// Mark every view `mutation` touches as stale and notify subscribers.
    pub fn record_success(&self, mutation: Mutation) -> Vec<View> {
        let views = mutation.invalidates();
        for view in &views {
            self.stale.insert(*view);
            // No subscribers is fine; the stale set still records it.
            let _ = self.tx.send(*view);
        }
        debug!("{:?} invalidated {:?}", mutation, views);
        views
    }

    pub fn is_stale(&self, view: View) -> bool {
        self.stale.contains(&view)
    }

    /// Clear the stale mark of `view`, returning whether it was set.
    pub fn take_stale(&self, view: View) -> bool {
        self.stale.remove(&view).is_some()
    }

    pub fn stale_views(&self) -> Vec<View> {
        self.stale.iter().map(|view| *view).collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<View> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table() {
        assert_eq!(
            Mutation::UpdateReading.invalidates(),
            vec![View::Readings, View::Dashboard]
        );
        assert_eq!(
            Mutation::AddFromRecommendation.invalidates(),
            vec![View::Readings, View::Dashboard, View::Recommendations]
        );
        assert_eq!(
            Mutation::UnfollowUser.invalidates(),
            vec![View::UserSearch, View::SocialFeed]
        );
        assert!(
            Mutation::UpdateProfile {
                viewed_profile: UserId(7)
            }
            .invalidates()
            .contains(&View::UserProfile(UserId(7)))
        );
    }

    #[test]
    fn status_update_leaves_recommendations_fresh() {
        let bus = InvalidationBus::new();
        bus.record_success(Mutation::UpdateReading);
        assert!(bus.is_stale(View::Readings));
        assert!(bus.is_stale(View::Dashboard));
        assert!(!bus.is_stale(View::Recommendations));
    }

    #[test]
    fn take_stale_consumes_the_mark() {
        let bus = InvalidationBus::new();
        bus.record_success(Mutation::FollowUser);
        assert!(bus.take_stale(View::SocialFeed));
        assert!(!bus.take_stale(View::SocialFeed));
        assert!(bus.is_stale(View::UserSearch));
    }

    #[tokio::test]
    async fn subscribers_see_each_view_once() {
        let bus = InvalidationBus::new();
        let mut rx = bus.subscribe();
        bus.record_success(Mutation::DismissRecommendation);

        assert_eq!(rx.recv().await.unwrap(), View::Recommendations);
        assert_eq!(rx.recv().await.unwrap(), View::Dashboard);
        assert!(rx.try_recv().is_err());
    }
}
