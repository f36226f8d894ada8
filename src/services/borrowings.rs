//! Borrow / return lifecycle
//!
//! A book is either available (no open borrowing) or borrowed (exactly one open
//! borrowing, owned by the user who opened it). Only the owner can close it.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{borrowing::Borrowing, user::CurrentUser},
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowingsService {
    repository: Repository,
}

impl BorrowingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    fn ensure_self(actor: &CurrentUser, user_id: i32, action: &str) -> AppResult<()> {
        if actor.id != user_id {
            tracing::debug!("User {} tried to {} for user {}", actor.id, action, user_id);
            return Err(AppError::Authorization(format!(
                "You can only {} for yourself",
                action
            )));
        }
        Ok(())
    }

    async fn ensure_book_exists(&self, book_id: i32) -> AppResult<()> {
        self.repository
            .books
            .get_by_id(book_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Available -> Borrowed
    pub async fn borrow(&self, actor: &CurrentUser, user_id: i32, book_id: i32) -> AppResult<Borrowing> {
        Self::ensure_self(actor, user_id, "borrow books")?;
        self.ensure_book_exists(book_id).await?;

        let borrowing = self
            .repository
            .borrowings
            .open(user_id, book_id, Utc::now())
            .await?
            .ok_or_else(|| AppError::BadRequest("Book is already borrowed".to_string()))?;

        tracing::info!("User {} borrowed book {}", user_id, book_id);
        Ok(borrowing)
    }

    /// Borrowed -> Available
    pub async fn return_book(&self, actor: &CurrentUser, user_id: i32, book_id: i32) -> AppResult<Borrowing> {
        Self::ensure_self(actor, user_id, "return books")?;
        self.ensure_book_exists(book_id).await?;

        let open = self
            .repository
            .borrowings
            .find_open_by_book(book_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Book is not borrowed yet".to_string()))?;

        if open.user_id != actor.id {
            return Err(AppError::Authorization(
                "This book was borrowed by another user".to_string(),
            ));
        }

        // a concurrent return of the same borrowing leaves nothing to close
        let returned = self
            .repository
            .borrowings
            .close(open.id, Utc::now())
            .await?
            .ok_or_else(|| AppError::BadRequest("Book is not borrowed yet".to_string()))?;

        tracing::info!("User {} returned book {}", user_id, book_id);
        Ok(returned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{book::CreateBook, user::Role};

    fn actor(id: i32) -> CurrentUser {
        CurrentUser {
            id,
            email: format!("user{}@example.com", id),
            role: Role::User,
        }
    }

    async fn setup() -> (Repository, BorrowingsService, i32) {
        let repository = Repository::in_memory();
        let book = repository
            .books
            .create(&CreateBook {
                title: "Dune".to_string(),
                detail: "A desert planet".to_string(),
                author: "Frank Herbert".to_string(),
                category: "Science".to_string(),
            })
            .await
            .unwrap();
        (repository.clone(), BorrowingsService::new(repository), book.id)
    }

    #[tokio::test]
    async fn test_borrow_then_return() {
        let (repository, borrowings, book_id) = setup().await;

        let opened = borrowings.borrow(&actor(1), 1, book_id).await.unwrap();
        assert_eq!(opened.user_id, 1);
        assert_eq!(opened.book_id, book_id);
        assert!(opened.is_open());

        let returned = borrowings.return_book(&actor(1), 1, book_id).await.unwrap();
        assert_eq!(returned.id, opened.id);
        assert!(returned.returned_at.is_some());
        assert!(repository.borrowings.find_open_by_book(book_id).await.unwrap().is_none());

        // the book cycles back to borrowable
        assert!(borrowings.borrow(&actor(2), 2, book_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_borrow_for_someone_else_is_forbidden() {
        let (_, borrowings, book_id) = setup().await;
        for target in [book_id, book_id + 1, 0] {
            let err = borrowings.borrow(&actor(1), 2, target).await.unwrap_err();
            assert!(matches!(err, AppError::Authorization(_)));
        }
    }

    #[tokio::test]
    async fn test_borrow_twice_is_bad_request() {
        let (_, borrowings, book_id) = setup().await;
        borrowings.borrow(&actor(1), 1, book_id).await.unwrap();

        let err = borrowings.borrow(&actor(2), 2, book_id).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Book is already borrowed"));
    }

    #[tokio::test]
    async fn test_borrow_missing_book() {
        let (_, borrowings, book_id) = setup().await;
        let err = borrowings.borrow(&actor(1), 1, book_id + 100).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_return_never_borrowed() {
        let (_, borrowings, book_id) = setup().await;
        let err = borrowings.return_book(&actor(1), 1, book_id).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Book is not borrowed yet"));
    }

    #[tokio::test]
    async fn test_return_someone_elses_borrowing() {
        let (_, borrowings, book_id) = setup().await;
        borrowings.borrow(&actor(1), 1, book_id).await.unwrap();

        let err = borrowings.return_book(&actor(2), 2, book_id).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));

        let err = borrowings.return_book(&actor(2), 1, book_id).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
