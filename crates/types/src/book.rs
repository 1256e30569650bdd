//! Book records and the payloads used to create them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::BookId;

/// Descriptive metadata shared by persisted books, new-book payloads and
/// recommendation targets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookDetails {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i32>,
}

impl BookDetails {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }
}

/// A book persisted by the backend. Its `id` is the stable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    #[serde(flatten)]
    pub details: BookDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_library_id: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Book {
    pub fn title(&self) -> &str {
        &self.details.title
    }

    pub fn author(&self) -> &str {
        &self.details.author
    }

    /// Payload that resubmits this book to the add-or-get endpoint.
    pub fn to_new_book(&self) -> NewBook {
        NewBook {
            details: self.details.clone(),
            open_library_id: self.open_library_id.clone(),
        }
    }
}

/// Body of `POST /books`. The backend returns the existing book when the
/// ISBN or Open Library id is already known.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewBook {
    #[serde(flatten)]
    pub details: BookDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_library_id: Option<String>,
}

/// A raw search hit from the external catalogue. It has no stable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSearchResult {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub open_library_key: Option<String>,
}

impl From<&BookSearchResult> for NewBook {
    fn from(result: &BookSearchResult) -> Self {
        NewBook {
            details: BookDetails {
                title: result.title.clone(),
                author: result.author.clone(),
                isbn: result.isbn.clone(),
                cover_url: result.cover_url.clone(),
                description: result.description.clone(),
                publication_year: result.publication_year,
                ..Default::default()
            },
            open_library_id: result.open_library_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_book_response() {
        let json = r#"{
            "id": 7,
            "title": "Dune",
            "author": "Frank Herbert",
            "isbn": "9780441013593",
            "cover_url": null,
            "total_pages": 412,
            "open_library_id": "OL893415W",
            "average_rating": 4.5,
            "created_at": "2024-01-05T10:00:00"
        }"#;

        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, BookId(7));
        assert_eq!(book.title(), "Dune");
        assert_eq!(book.details.total_pages, Some(412));
        assert_eq!(book.open_library_id.as_deref(), Some("OL893415W"));
    }

    #[test]
    fn search_result_maps_open_library_key() {
        let result = BookSearchResult {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            isbn: None,
            cover_url: None,
            description: None,
            publication_year: Some(1965),
            open_library_key: Some("/works/OL893415W".into()),
        };

        let new_book = NewBook::from(&result);
        assert_eq!(new_book.open_library_id.as_deref(), Some("/works/OL893415W"));
        assert_eq!(new_book.details.publication_year, Some(1965));

        let body = serde_json::to_value(&new_book).unwrap();
        assert_eq!(body["title"], "Dune");
        assert!(body.get("isbn").is_none());
    }
}
