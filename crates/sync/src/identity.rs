//! Resolve whether a book is already in a user's library.
//!
//! A persisted book is matched by id and nothing else. A book without an id
//! (a raw search hit) is matched on its normalized `(title, author)` pair:
//! lower-cased and trimmed, compared for exact equality. There is no fuzzy
//! matching, so a different edition or a typo is a miss and can still be
//! added.

use std::collections::HashMap;
use std::fmt;

use bookshelf_types::{Book, BookId, BookSearchResult, NewBook, Reading, Recommendation};

/// Lower-cased, trimmed `(title, author)` key. Never empty in either part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedIdentity {
    title: String,
    author: String,
}

impl NormalizedIdentity {
    /// Returns `None` when either part is blank after trimming.
    pub fn new(title: &str, author: &str) -> Option<Self> {
        let title = normalize(title);
        let author = normalize(author);
        if title.is_empty() || author.is_empty() {
            return None;
        }
        Some(Self { title, author })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}

impl fmt::Display for NormalizedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.title, self.author)
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A book as seen by the resolver: persisted (`id` set) or provisional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRef {
    pub id: Option<BookId>,
    pub title: String,
    pub author: String,
}

impl BookRef {
    pub fn persisted(id: BookId, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            title: title.into(),
            author: author.into(),
        }
    }

    pub fn provisional(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
        }
    }

    pub fn identity(&self) -> Option<NormalizedIdentity> {
        NormalizedIdentity::new(&self.title, &self.author)
    }
}

impl From<&Book> for BookRef {
    fn from(book: &Book) -> Self {
        BookRef::persisted(book.id, book.title(), book.author())
    }
}

impl From<&BookSearchResult> for BookRef {
    fn from(result: &BookSearchResult) -> Self {
        BookRef::provisional(result.title.clone(), result.author.clone())
    }
}

impl From<&NewBook> for BookRef {
    fn from(book: &NewBook) -> Self {
        BookRef::provisional(book.details.title.clone(), book.details.author.clone())
    }
}

impl From<&Recommendation> for BookRef {
    fn from(recommendation: &Recommendation) -> Self {
        BookRef::from(&recommendation.book)
    }
}

/// A user's readings indexed by book id and by normalized identity.
///
/// Readings without an embedded book can only be found by id.
#[derive(Debug, Clone, Default)]
pub struct LibraryIndex {
    by_book: HashMap<BookId, Reading>,
    by_identity: HashMap<NormalizedIdentity, BookId>,
}

impl LibraryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_readings(readings: impl IntoIterator<Item = Reading>) -> Self {
        let mut index = Self::new();
        for reading in readings {
            index.insert(reading);
        }
        index
    }

    /// Add or replace the reading for its book.
    pub fn insert(&mut self, reading: Reading) {
        if let Some(identity) = reading
            .book
            .as_ref()
            .and_then(|book| NormalizedIdentity::new(book.title(), book.author()))
        {
            self.by_identity.insert(identity, reading.book_id);
        }
        self.by_book.insert(reading.book_id, reading);
    }

    pub fn remove(&mut self, book_id: BookId) -> Option<Reading> {
        let removed = self.by_book.remove(&book_id)?;
        self.by_identity.retain(|_, id| *id != book_id);
        Some(removed)
    }

    pub fn get(&self, book_id: BookId) -> Option<&Reading> {
        self.by_book.get(&book_id)
    }

    pub fn len(&self) -> usize {
        self.by_book.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_book.is_empty()
    }

    pub fn readings(&self) -> impl Iterator<Item = &Reading> {
        self.by_book.values()
    }

    /// Find the reading for `book`, if any.
    pub fn resolve(&self, book: &BookRef) -> Option<&Reading> {
        match book.id {
            Some(id) => self.by_book.get(&id),
            None => {
                let identity = book.identity()?;
                let book_id = self.by_identity.get(&identity)?;
                self.by_book.get(book_id)
            }
        }
    }

    pub fn contains(&self, book: &BookRef) -> bool {
        self.resolve(book).is_some()
    }
}

/// Free-standing form of [`LibraryIndex::resolve`].
pub fn resolve<'a>(book: &BookRef, index: &'a LibraryIndex) -> Option<&'a Reading> {
    index.resolve(book)
}
