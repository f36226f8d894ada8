//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{FromRow, Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, BookSummary, CreateBook, UpdateBook},
};

/// Outcome of a guarded delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookDeletion {
    Deleted,
    NotFound,
    /// An open borrowing exists, nothing was removed
    Borrowed,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    /// Get book by ID
    async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>>;

    /// Insert a new catalog entry
    async fn create(&self, book: &CreateBook) -> AppResult<Book>;

    /// Apply a partial update, `None` if the book does not exist
    async fn update(&self, id: i32, patch: &UpdateBook) -> AppResult<Option<Book>>;

    /// Search by case-insensitive substrings, ordered by id, with availability
    async fn search(&self, query: &BookQuery) -> AppResult<Vec<BookSummary>>;

    /// Remove the book and its borrowing history unless it is currently borrowed
    async fn delete_unless_borrowed(&self, id: i32) -> AppResult<BookDeletion>;

    /// Number of catalog entries
    async fn count(&self) -> AppResult<i64>;
}

/// Escapes LIKE wildcards so user input only matches literally
fn contains_pattern(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| {
        let escaped = v
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksRepository for PgBooksRepository {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, detail, author, category)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.detail)
        .bind(&book.author)
        .bind(&book.category)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, id: i32, patch: &UpdateBook) -> AppResult<Option<Book>> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                detail = COALESCE($3, detail),
                author = COALESCE($4, author),
                category = COALESCE($5, category),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.detail)
        .bind(&patch.author)
        .bind(&patch.category)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn search(&self, query: &BookQuery) -> AppResult<Vec<BookSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT b.*,
                   EXISTS(
                       SELECT 1 FROM borrowings br
                       WHERE br.book_id = b.id AND br.returned_at IS NULL
                   ) AS borrowed
            FROM books b
            WHERE ($1::text IS NULL OR b.title ILIKE $1)
              AND ($2::text IS NULL OR b.author ILIKE $2)
              AND ($3::text IS NULL OR b.category ILIKE $3)
            ORDER BY b.id
            "#,
        )
        .bind(contains_pattern(&query.title))
        .bind(contains_pattern(&query.author))
        .bind(contains_pattern(&query.category))
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let borrowed: bool = row.try_get("borrowed")?;
            result.push(BookSummary::new(Book::from_row(&row)?, borrowed));
        }
        Ok(result)
    }

    async fn delete_unless_borrowed(&self, id: i32) -> AppResult<BookDeletion> {
        let mut tx = self.pool.begin().await?;

        // Row lock blocks concurrent borrowings (FK check) until we are done
        let existing: Option<i32> =
            sqlx::query_scalar("SELECT id FROM books WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Ok(BookDeletion::NotFound);
        }

        let borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrowings WHERE book_id = $1 AND returned_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if borrowed {
            return Ok(BookDeletion::Borrowed);
        }

        sqlx::query("DELETE FROM borrowings WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(BookDeletion::Deleted)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
