pub mod config;
pub mod feed;
pub mod library;
pub mod recommendations;
pub mod social;

use std::path::PathBuf;
use std::sync::Arc;

use bookshelf_client::{BackendApi, HttpBackend};
use bookshelf_sync::{FeedAggregator, InvalidationBus, LibraryOrchestrator, SocialActions};
use eyre::Result;
use url::Url;

use crate::config::Config;

pub use config::handle_config_command;
pub use feed::handle_feed_command;
pub use library::{
    handle_add_command, handle_library_command, handle_remove_command, handle_search_command,
    handle_status_command,
};
pub use recommendations::handle_recommendations_command;
pub use social::{handle_follow_command, handle_unfollow_command};

/// Backend handle and sync components built from the loaded config.
pub struct Session {
    pub backend: Arc<dyn BackendApi>,
    pub bus: Arc<InvalidationBus>,
    pub config: Config,
    pub config_path: PathBuf,
}

impl Session {
    pub fn connect(config: Config, config_path: PathBuf) -> Result<Self> {
        let base_url = Url::parse(&config.api.base_url)
            .map_err(|e| eyre::eyre!("Invalid api.base_url '{}': {}", config.api.base_url, e))?;
        let token = config.token();
        if token.is_none() {
            tracing::warn!("No API token configured; most requests will be rejected");
        }
        let backend = HttpBackend::new(base_url, token.as_deref())?;

        Ok(Self {
            backend: Arc::new(backend),
            bus: Arc::new(InvalidationBus::new()),
            config,
            config_path,
        })
    }

    pub fn orchestrator(&self) -> Result<LibraryOrchestrator> {
        Ok(
            LibraryOrchestrator::new(self.backend.clone(), self.config.user_id()?, self.bus.clone())
                .with_config(self.config.sync.clone()),
        )
    }

    pub fn feed(&self) -> FeedAggregator {
        FeedAggregator::new(self.backend.clone(), self.config.sync.feed_page_size)
            .with_bus(self.bus.clone())
    }

    pub fn social(&self) -> SocialActions {
        SocialActions::new(self.backend.clone(), self.bus.clone())
    }
}
