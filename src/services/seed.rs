//! Demo data for development environments

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{book::CreateBook, user::Role},
    repository::Repository,
};

use super::credentials::CredentialService;

const DEMO_PASSWORD: &str = "123456789";
const CATEGORIES: [&str; 4] = ["Fiction", "Non-Fiction", "Science", "History"];
const TITLES: u32 = 20;

/// Catalog rows per title; titles not listed have a single row
fn copies_of(number: u32) -> usize {
    match number {
        1 | 4 => 3,
        2 => 2,
        _ => 1,
    }
}

fn demo_books() -> Vec<CreateBook> {
    (1..=TITLES)
        .flat_map(|number| {
            let book = CreateBook {
                title: format!("Book {}", number),
                detail: format!("Detail for book {}", number),
                author: format!("Author {}", number),
                category: CATEGORIES[(number as usize - 1) % CATEGORIES.len()].to_string(),
            };
            std::iter::repeat(book).take(copies_of(number))
        })
        .collect()
}

/// Insert demo users, books and open borrowings into an empty catalog.
/// Returns false when the catalog already has rows.
pub async fn seed_demo_data(repository: &Repository, credentials: &CredentialService) -> AppResult<bool> {
    let existing = repository.books.count().await?;
    if existing > 0 {
        tracing::info!("Catalog already holds {} books, skipping demo data", existing);
        return Ok(false);
    }

    let password = credentials.hash_password(DEMO_PASSWORD)?;
    repository
        .users
        .create("admin@example.com", &password, Role::Admin)
        .await?;
    let first = repository
        .users
        .create("user1@example.com", &password, Role::User)
        .await?;
    let second = repository
        .users
        .create("user2@example.com", &password, Role::User)
        .await?;

    let mut book_ids = Vec::new();
    for book in demo_books() {
        book_ids.push(repository.books.create(&book).await?.id);
    }

    let now = Utc::now();
    let owners = [first.id, first.id, second.id, second.id, first.id];
    for (user_id, book_id) in owners.iter().zip(book_ids.iter()) {
        repository.borrowings.open(*user_id, *book_id, now).await?;
    }

    tracing::info!(
        "Seeded demo data: 3 users, {} books, {} borrowings",
        book_ids.len(),
        owners.len()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_shape() {
        let books = demo_books();
        assert_eq!(books.len(), 25);
        assert_eq!(books.iter().filter(|b| b.title == "Book 1").count(), 3);
        assert_eq!(books.iter().filter(|b| b.title == "Book 4").count(), 3);
        assert_eq!(books[3].category, "Non-Fiction");
        assert_eq!(books[9].title, "Book 5");
        assert_eq!(books[9].category, "Fiction");
        assert_eq!(books[24].category, "History");
    }

    #[tokio::test]
    async fn test_seed_runs_once() {
        let repository = Repository::in_memory();
        let credentials = CredentialService::new();

        assert!(seed_demo_data(&repository, &credentials).await.unwrap());
        assert!(!seed_demo_data(&repository, &credentials).await.unwrap());
        assert_eq!(repository.books.count().await.unwrap(), 25);

        let admin = repository
            .users
            .get_by_email("admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(credentials.verify_password(DEMO_PASSWORD, &admin.password).unwrap());

        let open = repository.borrowings.find_open_by_book(3).await.unwrap().unwrap();
        assert_eq!(open.user_id, 3);
    }
}
