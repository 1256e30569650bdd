//! reqwest-backed implementation of [`BackendApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use bookshelf_types::{
    Book, BookSearchResult, NewBook, NewReading, ProfileUpdate, Reading, ReadingId, ReadingStatus,
    ReadingUpdate, Recommendation, RecommendationId, SocialFeedPage, UserId, UserSummary,
};

use crate::api::BackendApi;
use crate::error::{ApiError, Result};

pub const USER_AGENT: &str = concat!("bookshelf-client/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to the Bookshelf backend over HTTP with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a client for `base_url`, authenticating with `token` when given.
    pub fn new(base_url: Url, token: Option<&str>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::new(crate::ErrorKind::Authentication, e.to_string()))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        // `Url::join` replaces the last segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::transport(format!("Invalid endpoint {}: {}", path, e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ApiError::from)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        debug!("Executing backend request: method={}, url={}", request.method(), request.url());

        let response = self.client.execute(request).await?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    debug!("Backend responded with status {}: {}", status, detail);
    Err(ApiError::from_status(status.as_u16(), detail))
}

/// Pull the `detail` field out of an error body; validation errors carry a
/// list there instead of a string.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn add_book(&self, book: &NewBook) -> Result<Book> {
        let url = self.url("books/", &[])?;
        self.send_json(self.client.post(url).json(book)).await
    }

    async fn search_books(&self, query: &str, limit: u32) -> Result<Vec<BookSearchResult>> {
        let url = self.url(
            "books/search",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )?;
        self.send_json(self.client.get(url)).await
    }

    async fn create_reading(&self, user_id: UserId, reading: &NewReading) -> Result<Reading> {
        let url = self.url("readings/", &[("user_id", user_id.to_string())])?;
        self.send_json(self.client.post(url).json(reading)).await
    }

    async fn update_reading(&self, id: ReadingId, update: &ReadingUpdate) -> Result<Reading> {
        let url = self.url(&format!("readings/{}", id), &[])?;
        self.send_json(self.client.put(url).json(update)).await
    }

    async fn delete_reading(&self, id: ReadingId) -> Result<()> {
        let url = self.url(&format!("readings/{}", id), &[])?;
        self.send(self.client.delete(url)).await.map(|_| ())
    }

    async fn list_readings(
        &self,
        user_id: UserId,
        status: Option<ReadingStatus>,
    ) -> Result<Vec<Reading>> {
        let query: Vec<(&str, String)> = status
            .map(|status| vec![("status", status.to_string())])
            .unwrap_or_default();
        let url = self.url(&format!("readings/user/{}", user_id), &query)?;
        self.send_json(self.client.get(url)).await
    }

    async fn list_recommendations(&self) -> Result<Vec<Recommendation>> {
        let url = self.url("recommendations/", &[])?;
        self.send_json(self.client.get(url)).await
    }

    async fn dismiss_recommendation(&self, id: RecommendationId) -> Result<()> {
        let url = self.url(&format!("recommendations/{}/dismiss", id), &[])?;
        self.send(self.client.put(url)).await.map(|_| ())
    }

    async fn social_feed(&self, limit: u32, offset: u32) -> Result<SocialFeedPage> {
        let url = self.url(
            "social/feed",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )?;
        self.send_json(self.client.get(url)).await
    }

    async fn follow_user(&self, user_id: UserId) -> Result<()> {
        let url = self.url("social/follow", &[])?;
        let body = json!({ "following_id": user_id });
        self.send(self.client.post(url).json(&body)).await.map(|_| ())
    }

    async fn unfollow_user(&self, user_id: UserId) -> Result<()> {
        let url = self.url(&format!("social/unfollow/{}", user_id), &[])?;
        self.send(self.client.delete(url)).await.map(|_| ())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserSummary> {
        let url = self.url("users/me", &[])?;
        self.send_json(self.client.put(url).json(update)).await
    }
}
