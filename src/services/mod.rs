//! Business logic services

pub mod auth;
pub mod books;
pub mod borrowings;
pub mod catalog;
pub mod credentials;
pub mod seed;
pub mod tokens;

use crate::{config::AuthConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub books: books::BooksService,
    pub borrowings: borrowings::BorrowingsService,
    pub catalog: catalog::CatalogService,
    repository: Repository,
    credentials: credentials::CredentialService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: &AuthConfig) -> Self {
        let credentials = credentials::CredentialService::new();
        let tokens = tokens::TokenService::new(auth_config);

        Self {
            auth: auth::AuthService::new(repository.clone(), credentials.clone(), tokens),
            books: books::BooksService::new(repository.clone()),
            borrowings: borrowings::BorrowingsService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            repository,
            credentials,
        }
    }

    /// Populate an empty store with the demo data set
    pub async fn seed_demo_data(&self) -> AppResult<bool> {
        seed::seed_demo_data(&self.repository, &self.credentials).await
    }
}
