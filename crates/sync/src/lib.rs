//! Client-side sync core for Bookshelf.
//!
//! Sits between a host UI and the backend API:
//!
//! - [`LibraryIndex`] answers "is this book already in my library?"
//! - [`RetryPolicy`] retries flaky backend calls with exponential backoff.
//! - [`LibraryOrchestrator`] runs the multi-step library mutations with
//!   at most one pending mutation per entity.
//! - [`FeedAggregator`] merges the paginated social feed into one timeline.
//! - [`InvalidationBus`] tracks which views successful mutations made stale.

pub mod config;
pub mod error;
pub mod feed;
pub mod identity;
pub mod inflight;
pub mod invalidation;
pub mod notify;
pub mod orchestrator;
pub mod retry;
pub mod social;

pub use config::SyncConfig;
pub use error::{MutationError, Result};
pub use feed::{FeedAggregator, PageOutcome, build_feed};
pub use identity::{BookRef, LibraryIndex, NormalizedIdentity, resolve};
pub use inflight::{EntityKey, InFlight, InFlightGuard, InFlightKind};
pub use invalidation::{InvalidationBus, Mutation, View};
pub use notify::{Notice, Notifier, Severity, TracingNotifier};
pub use orchestrator::{BookSource, Conversion, LibraryAddition, LibraryOrchestrator};
pub use retry::{RetryError, RetryPolicy, retry};
pub use social::SocialActions;
