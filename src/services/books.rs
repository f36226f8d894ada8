//! Catalog management (admin side)

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::{BookDeletion, Repository},
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book to the catalog
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        let created = self.repository.books.create(&book).await?;
        tracing::info!("Created book id={} title={:?}", created.id, created.title);
        Ok(created)
    }

    /// Update the provided fields of a book
    pub async fn update_book(&self, id: i32, patch: UpdateBook) -> AppResult<Book> {
        if patch.is_empty() {
            return Err(AppError::BadRequest(
                "Please provide at least one field to update".to_string(),
            ));
        }

        self.repository
            .books
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Delete a book and its borrowing history; refused while the book is out
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        match self.repository.books.delete_unless_borrowed(id).await? {
            BookDeletion::Deleted => {
                tracing::info!("Deleted book id={}", id);
                Ok(())
            }
            BookDeletion::NotFound => Err(AppError::NotFound("Book not found".to_string())),
            BookDeletion::Borrowed => Err(AppError::Conflict(
                "Book is borrowed, cannot delete".to_string(),
            )),
        }
    }
}
