use std::sync::Arc;

use bookshelf_client::BackendApi;
use bookshelf_types::{ProfileUpdate, UserId, UserSummary};
use tracing::info;

use crate::error::{MutationError, Result};
use crate::invalidation::{InvalidationBus, Mutation};
use crate::notify::{Notice, Notifier, TracingNotifier};

/// Follow graph and profile mutations.
///
/// Following or unfollowing marks the social feed stale, which makes a
/// [`FeedAggregator`](crate::FeedAggregator) sharing the bus start over.
pub struct SocialActions {
    backend: Arc<dyn BackendApi>,
    bus: Arc<InvalidationBus>,
    notifier: Arc<dyn Notifier>,
}

impl SocialActions {
    pub fn new(backend: Arc<dyn BackendApi>, bus: Arc<InvalidationBus>) -> Self {
        Self {
            backend,
            bus,
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub async fn follow_user(&self, user: UserId) -> Result<()> {
        self.backend
            .follow_user(user)
            .await
            .map_err(|e| self.fail(MutationError::from_backend(e, 1)))?;
        self.bus.record_success(Mutation::FollowUser);
        info!("Following user {}", user);
        Ok(())
    }

    pub async fn unfollow_user(&self, user: UserId) -> Result<()> {
        self.backend
            .unfollow_user(user)
            .await
            .map_err(|e| self.fail(MutationError::from_backend(e, 1)))?;
        self.bus.record_success(Mutation::UnfollowUser);
        info!("Unfollowed user {}", user);
        Ok(())
    }

    /// Update the current user's profile while `viewed_profile` is on screen.
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
        viewed_profile: UserId,
    ) -> Result<UserSummary> {
        let user = self
            .backend
            .update_profile(update)
            .await
            .map_err(|e| self.fail(MutationError::from_backend(e, 1)))?;
        self.bus
            .record_success(Mutation::UpdateProfile { viewed_profile });
        self.notifier.notify(Notice::info("Profile updated"));
        Ok(user)
    }

    fn fail(&self, error: MutationError) -> MutationError {
        self.notifier.notify(Notice::error(error.user_message()));
        error
    }
}
