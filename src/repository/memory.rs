//! In-process store implementing every repository trait.
//!
//! All tables live behind one lock so multi-table operations (guarded delete,
//! check-and-insert of an open borrowing) are atomic like their SQL counterparts.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, BookSummary, BorrowTally, CreateBook, UpdateBook},
        borrowing::Borrowing,
        user::{Role, User},
    },
};

use super::{BookDeletion, BooksRepository, BorrowingsRepository, UsersRepository};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    books: BTreeMap<i32, Book>,
    borrowings: BTreeMap<i32, Borrowing>,
    last_user_id: i32,
    last_book_id: i32,
    last_borrowing_id: i32,
}

impl Tables {
    fn open_borrowing(&self, book_id: i32) -> Option<&Borrowing> {
        self.borrowings
            .values()
            .find(|b| b.book_id == book_id && b.is_open())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[async_trait]
impl UsersRepository for MemoryStore {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, email: &str, password_hash: &str, role: Role) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict("Email already exists!".to_string()));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            email: email.to_string(),
            password: password_hash.to_string(),
            role,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl BooksRepository for MemoryStore {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        Ok(self.tables.read().await.books.get(&id).cloned())
    }

    async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        tables.last_book_id += 1;
        let created = Book {
            id: tables.last_book_id,
            title: book.title.clone(),
            detail: book.detail.clone(),
            author: book.author.clone(),
            category: book.category.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.books.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, patch: &UpdateBook) -> AppResult<Option<Book>> {
        let mut tables = self.tables.write().await;
        Ok(tables.books.get_mut(&id).map(|book| {
            patch.apply(book);
            book.updated_at = Utc::now();
            book.clone()
        }))
    }

    async fn search(&self, query: &BookQuery) -> AppResult<Vec<BookSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|book| query.matches(book))
            .map(|book| BookSummary::new(book.clone(), tables.open_borrowing(book.id).is_some()))
            .collect())
    }

    async fn delete_unless_borrowed(&self, id: i32) -> AppResult<BookDeletion> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&id) {
            return Ok(BookDeletion::NotFound);
        }
        if tables.open_borrowing(id).is_some() {
            return Ok(BookDeletion::Borrowed);
        }

        tables.borrowings.retain(|_, b| b.book_id != id);
        tables.books.remove(&id);
        Ok(BookDeletion::Deleted)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.books.len() as i64)
    }
}

#[async_trait]
impl BorrowingsRepository for MemoryStore {
    async fn find_open_by_book(&self, book_id: i32) -> AppResult<Option<Borrowing>> {
        Ok(self.tables.read().await.open_borrowing(book_id).cloned())
    }

    async fn open(
        &self,
        user_id: i32,
        book_id: i32,
        borrowed_at: DateTime<Utc>,
    ) -> AppResult<Option<Borrowing>> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&book_id) {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        if tables.open_borrowing(book_id).is_some() {
            return Ok(None);
        }

        tables.last_borrowing_id += 1;
        let borrowing = Borrowing {
            id: tables.last_borrowing_id,
            user_id,
            book_id,
            borrowed_at,
            returned_at: None,
        };
        tables.borrowings.insert(borrowing.id, borrowing.clone());
        Ok(Some(borrowing))
    }

    async fn close(&self, id: i32, returned_at: DateTime<Utc>) -> AppResult<Option<Borrowing>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .borrowings
            .get_mut(&id)
            .filter(|b| b.is_open())
            .map(|b| {
                b.returned_at = Some(returned_at);
                b.clone()
            }))
    }

    async fn tallies_borrowed_before(&self, before: DateTime<Utc>) -> AppResult<Vec<BorrowTally>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter_map(|book| {
                let history: Vec<&Borrowing> = tables
                    .borrowings
                    .values()
                    .filter(|b| b.book_id == book.id)
                    .collect();
                history
                    .iter()
                    .any(|b| b.borrowed_at < before)
                    .then(|| BorrowTally {
                        book: book.clone(),
                        borrowings: history.len() as i64,
                    })
            })
            .collect())
    }
}
