//! Catalog queries: search, single fetch and popularity

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::book::{most_popular, Book, BookQuery, BookSummary, MostBorrowed},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books by title, author and/or category
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<Vec<BookSummary>> {
        let query = query
            .normalized()
            .ok_or_else(|| AppError::BadRequest("Please provide a search query!".to_string()))?;

        self.repository.books.search(&query).await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// The title with the most borrowings to date
    pub async fn most_borrowed(&self) -> AppResult<MostBorrowed> {
        let tallies = self
            .repository
            .borrowings
            .tallies_borrowed_before(Utc::now())
            .await?;

        most_popular(tallies).ok_or_else(|| AppError::NotFound("No books found!".to_string()))
    }

    /// Cheap store round trip for readiness checks
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.books.count().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::{
        models::book::{BookStatus, CreateBook},
        repository::{borrowings::MockBorrowingsRepository, MemoryStore},
    };

    fn new_book(title: &str, author: &str, category: &str) -> CreateBook {
        CreateBook {
            title: title.to_string(),
            detail: format!("Detail for {}", title),
            author: author.to_string(),
            category: category.to_string(),
        }
    }

    async fn borrow(repository: &Repository, user_id: i32, book_id: i32) {
        repository
            .borrowings
            .open(user_id, book_id, Utc::now() - Duration::seconds(1))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_requires_a_criterion() {
        let catalog = CatalogService::new(Repository::in_memory());

        let err = catalog.search_books(&BookQuery::default()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Please provide a search query!"));

        let blank = BookQuery {
            category: Some("".to_string()),
            ..Default::default()
        };
        assert!(catalog.search_books(&blank).await.is_err());
    }

    #[tokio::test]
    async fn test_search_reports_availability() {
        let repository = Repository::in_memory();
        let catalog = CatalogService::new(repository.clone());
        let hobbit = repository
            .books
            .create(&new_book("The Hobbit", "Tolkien", "Fiction"))
            .await
            .unwrap();
        let silmarillion = repository
            .books
            .create(&new_book("The Silmarillion", "Tolkien", "Fiction"))
            .await
            .unwrap();
        repository
            .books
            .create(&new_book("Dune", "Herbert", "Science"))
            .await
            .unwrap();
        borrow(&repository, 1, silmarillion.id).await;

        let found = catalog
            .search_books(&BookQuery {
                author: Some("tolkien".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, hobbit.id);
        assert_eq!(found[0].status, BookStatus::Available);
        assert_eq!(found[1].id, silmarillion.id);
        assert_eq!(found[1].status, BookStatus::Borrowed);

        let none = catalog
            .search_books(&BookQuery {
                title: Some("Neuromancer".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let repository = Repository::in_memory();
        let catalog = CatalogService::new(repository.clone());
        let created = repository
            .books
            .create(&new_book("Dune", "Herbert", "Science"))
            .await
            .unwrap();

        let fetched = catalog.get_book(created.id).await.unwrap();
        assert_eq!(fetched, created);

        let err = catalog.get_book(created.id + 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_most_borrowed_empty() {
        let catalog = CatalogService::new(Repository::in_memory());
        let err = catalog.most_borrowed().await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "No books found!"));
    }

    #[tokio::test]
    async fn test_most_borrowed_groups_copies_by_title() {
        let repository = Repository::in_memory();
        let catalog = CatalogService::new(repository.clone());
        for (user_id, title) in [(1, "Book A"), (2, "Book B"), (3, "Book A")] {
            let book = repository
                .books
                .create(&new_book(title, "Author", "Fiction"))
                .await
                .unwrap();
            borrow(&repository, user_id, book.id).await;
        }

        let top = catalog.most_borrowed().await.unwrap();
        assert_eq!(top.title, "Book A");
        assert_eq!(top.borrow_count, 2);
        assert_eq!(top.popular, 2);
    }

    #[tokio::test]
    async fn test_most_borrowed_store_failure() {
        let mut mock = MockBorrowingsRepository::new();
        mock.expect_tallies_borrowed_before()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let store = Arc::new(MemoryStore::default());
        let repository = Repository::from_parts(store.clone(), store, Arc::new(mock));

        let err = CatalogService::new(repository).most_borrowed().await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
