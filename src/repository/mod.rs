//! Repository layer for store operations
//!
//! Services only see the traits below; the PostgreSQL and memory backends both implement them.

pub mod books;
pub mod borrowings;
pub mod memory;
pub mod users;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use books::{BookDeletion, BooksRepository, PgBooksRepository};
pub use borrowings::{BorrowingsRepository, PgBorrowingsRepository};
pub use memory::MemoryStore;
pub use users::{PgUsersRepository, UsersRepository};

/// Handle on every store the services use
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UsersRepository>,
    pub books: Arc<dyn BooksRepository>,
    pub borrowings: Arc<dyn BorrowingsRepository>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(PgUsersRepository::new(pool.clone())),
            books: Arc::new(PgBooksRepository::new(pool.clone())),
            borrowings: Arc::new(PgBorrowingsRepository::new(pool)),
        }
    }

    /// Create a repository backed by a fresh in-process store
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            users: store.clone(),
            books: store.clone(),
            borrowings: store,
        }
    }

    /// Assemble a repository from individual stores
    pub fn from_parts(
        users: Arc<dyn UsersRepository>,
        books: Arc<dyn BooksRepository>,
        borrowings: Arc<dyn BorrowingsRepository>,
    ) -> Self {
        Self {
            users,
            books,
            borrowings,
        }
    }
}
