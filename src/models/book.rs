//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub detail: String,
    pub author: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Availability of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Borrowed,
}

impl BookStatus {
    pub fn from_open_borrowing(borrowed: bool) -> Self {
        if borrowed {
            BookStatus::Borrowed
        } else {
            BookStatus::Available
        }
    }
}

/// Search result entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub detail: String,
    pub author: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: BookStatus,
}

impl BookSummary {
    pub fn new(book: Book, borrowed: bool) -> Self {
        BookSummary {
            id: book.id,
            title: book.title,
            detail: book.detail,
            author: book.author,
            category: book.category,
            created_at: book.created_at,
            updated_at: book.updated_at,
            status: BookStatus::from_open_borrowing(borrowed),
        }
    }
}

/// Book search query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Substring of the title
    pub title: Option<String>,
    /// Substring of the author
    pub author: Option<String>,
    /// Substring of the category
    pub category: Option<String>,
}

impl BookQuery {
    /// Drops blank criteria; `None` when nothing is left to search on
    pub fn normalized(&self) -> Option<BookQuery> {
        fn keep(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        let query = BookQuery {
            title: keep(&self.title),
            author: keep(&self.author),
            category: keep(&self.category),
        };

        if query.title.is_none() && query.author.is_none() && query.category.is_none() {
            None
        } else {
            Some(query)
        }
    }

    /// Case-insensitive containment on every provided criterion
    pub fn matches(&self, book: &Book) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_ref()
                .map(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
                .unwrap_or(true)
        }

        contains(&book.title, &self.title)
            && contains(&book.author, &self.author)
            && contains(&book.category, &self.category)
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Detail is required"))]
    pub detail: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
}

/// Partial book update request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Detail must not be empty"))]
    pub detail: Option<String>,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: Option<String>,
    #[validate(length(min = 1, message = "Category must not be empty"))]
    pub category: Option<String>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.detail.is_none() && self.author.is_none() && self.category.is_none()
    }

    /// Applies provided fields onto an existing record
    pub fn apply(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref detail) = self.detail {
            book.detail = detail.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(ref category) = self.category {
            book.category = category.clone();
        }
    }
}

/// A book together with the number of borrowings recorded for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowTally {
    pub book: Book,
    pub borrowings: i64,
}

/// Popularity summary of a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MostBorrowed {
    pub title: String,
    pub detail: String,
    pub author: String,
    pub category: String,
    /// Number of catalog rows sharing this title
    pub borrow_count: i64,
    /// Total borrowings across those rows
    pub popular: i64,
}

/// Folds tallies by title, keeping first-seen order.
/// Catalog rows with the same title are counted as copies of one work.
pub fn group_by_title(tallies: Vec<BorrowTally>) -> Vec<MostBorrowed> {
    let mut grouped: Vec<MostBorrowed> = Vec::new();

    for tally in tallies {
        match grouped.iter_mut().find(|entry| entry.title == tally.book.title) {
            Some(entry) => {
                entry.borrow_count += 1;
                entry.popular += tally.borrowings;
            }
            None => grouped.push(MostBorrowed {
                title: tally.book.title,
                detail: tally.book.detail,
                author: tally.book.author,
                category: tally.book.category,
                borrow_count: 1,
                popular: tally.borrowings,
            }),
        }
    }

    grouped
}

/// Highest `popular` entry; ties go to the first encountered
pub fn most_popular(tallies: Vec<BorrowTally>) -> Option<MostBorrowed> {
    let mut grouped = group_by_title(tallies);
    // stable: equal counts keep encounter order
    grouped.sort_by(|a, b| b.popular.cmp(&a.popular));
    grouped.into_iter().next()
}
