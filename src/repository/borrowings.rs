//! Borrowings repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BorrowTally},
        borrowing::Borrowing,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowingsRepository: Send + Sync {
    /// The open borrowing of a book, if any
    async fn find_open_by_book(&self, book_id: i32) -> AppResult<Option<Borrowing>>;

    /// Open a borrowing; `None` when the book already has an open one.
    /// Check and insert are a single atomic step.
    async fn open(
        &self,
        user_id: i32,
        book_id: i32,
        borrowed_at: DateTime<Utc>,
    ) -> AppResult<Option<Borrowing>>;

    /// Close an open borrowing; `None` when it was already closed
    async fn close(&self, id: i32, returned_at: DateTime<Utc>) -> AppResult<Option<Borrowing>>;

    /// Books with at least one borrowing before `before`, with their total borrowing counts, by id
    async fn tallies_borrowed_before(&self, before: DateTime<Utc>) -> AppResult<Vec<BorrowTally>>;
}

#[derive(Clone)]
pub struct PgBorrowingsRepository {
    pool: Pool<Postgres>,
}

impl PgBorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowingsRepository for PgBorrowingsRepository {
    async fn find_open_by_book(&self, book_id: i32) -> AppResult<Option<Borrowing>> {
        let borrowing = sqlx::query_as::<_, Borrowing>(
            "SELECT * FROM borrowings WHERE book_id = $1 AND returned_at IS NULL",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(borrowing)
    }

    async fn open(
        &self,
        user_id: i32,
        book_id: i32,
        borrowed_at: DateTime<Utc>,
    ) -> AppResult<Option<Borrowing>> {
        // borrowings_one_open_per_book turns a concurrent second borrow into a no-op
        sqlx::query_as::<_, Borrowing>(
            r#"
            INSERT INTO borrowings (user_id, book_id, borrowed_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (book_id) WHERE returned_at IS NULL DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(borrowed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            // the book was deleted between lookup and insert
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::NotFound("Book not found".to_string())
            }
            _ => AppError::Database(e),
        })
    }

    async fn close(&self, id: i32, returned_at: DateTime<Utc>) -> AppResult<Option<Borrowing>> {
        let borrowing = sqlx::query_as::<_, Borrowing>(
            r#"
            UPDATE borrowings SET returned_at = $2
            WHERE id = $1 AND returned_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(returned_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(borrowing)
    }

    async fn tallies_borrowed_before(&self, before: DateTime<Utc>) -> AppResult<Vec<BorrowTally>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.title, b.detail, b.author, b.category, b.created_at, b.updated_at,
                   COUNT(br.id) AS borrowings
            FROM books b
            JOIN borrowings br ON br.book_id = b.id
            GROUP BY b.id
            HAVING MIN(br.borrowed_at) < $1
            ORDER BY b.id
            "#,
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await?;

        let mut tallies = Vec::with_capacity(rows.len());
        for row in rows {
            tallies.push(BorrowTally {
                book: Book::from_row(&row)?,
                borrowings: row.try_get("borrowings")?,
            });
        }
        Ok(tallies)
    }
}
