//! Terminal outcomes of library mutations.

use bookshelf_client::ApiError;
use bookshelf_types::InvalidUpdate;
use thiserror::Error;

use crate::inflight::EntityKey;

#[derive(Debug, Clone, Error)]
pub enum MutationError {
    /// The book is already a library entry, either locally resolved or
    /// reported as a conflict by the backend.
    #[error("Book is already in the library")]
    AlreadyInLibrary {
        #[source]
        source: Option<ApiError>,
    },

    /// Another mutation on the same entity has not settled yet.
    #[error("A mutation for {0} is already in flight")]
    InFlight(EntityKey),

    #[error("Invalid update: {0}")]
    InvalidUpdate(#[from] InvalidUpdate),

    /// The book has no id and a blank title or author.
    #[error("Book needs a title and an author")]
    MissingIdentity,

    #[error("Authentication required")]
    Authentication {
        #[source]
        source: ApiError,
    },

    #[error("Mutation failed after {attempts} attempt(s)")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: ApiError,
    },
}

impl MutationError {
    /// Classify the last backend error of a failed sequence.
    pub(crate) fn from_api(error: ApiError, attempts: u32) -> Self {
        if error.is_conflict() {
            MutationError::AlreadyInLibrary {
                source: Some(error),
            }
        } else if error.is_auth() {
            MutationError::Authentication { source: error }
        } else {
            MutationError::RetriesExhausted {
                attempts,
                last: error,
            }
        }
    }

    /// Like [`from_api`](Self::from_api) for mutations where a conflict
    /// says nothing about the library.
    pub(crate) fn from_backend(error: ApiError, attempts: u32) -> Self {
        if error.is_auth() {
            MutationError::Authentication { source: error }
        } else {
            MutationError::RetriesExhausted {
                attempts,
                last: error,
            }
        }
    }

    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            MutationError::AlreadyInLibrary { .. } => "This book is already in your library".into(),
            MutationError::InFlight(_) => "Still working on it, please wait".into(),
            MutationError::InvalidUpdate(reason) => reason.to_string(),
            MutationError::MissingIdentity => "A book needs a title and an author".into(),
            MutationError::Authentication { .. } => "Please sign in again to continue".into(),
            MutationError::RetriesExhausted { .. } => {
                "Something went wrong, please try again".into()
            }
        }
    }

    /// Suppressed duplicates are not failures the user needs to hear about.
    pub fn is_suppressed(&self) -> bool {
        matches!(self, MutationError::InFlight(_))
    }
}

pub type Result<T> = std::result::Result<T, MutationError>;
