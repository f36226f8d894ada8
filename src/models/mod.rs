//! Data models for the library server

pub mod book;
pub mod borrowing;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookQuery, BookStatus, BookSummary, BorrowTally, MostBorrowed};
pub use borrowing::Borrowing;
pub use user::{CurrentUser, Role, User};
