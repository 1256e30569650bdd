//! Backend access for the Bookshelf client.
//!
//! [`BackendApi`] is the seam the sync core is written against; [`HttpBackend`]
//! implements it over reqwest. Failures are reported as [`ApiError`], already
//! classified by [`ErrorKind`].

pub mod api;
pub mod error;
pub mod http;

pub use api::BackendApi;
pub use error::{ApiError, ErrorKind, Result};
pub use http::HttpBackend;
