//! Registration, login and request authentication

use crate::{
    error::{AppError, AppResult},
    models::user::{normalize_email, CurrentUser, LoginRequest, RegisterUser, Role, User},
    repository::Repository,
};

use super::{credentials::CredentialService, tokens::TokenService};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    credentials: CredentialService,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(repository: Repository, credentials: CredentialService, tokens: TokenService) -> Self {
        Self {
            repository,
            credentials,
            tokens,
        }
    }

    /// Register a new reader account
    pub async fn register(&self, request: RegisterUser) -> AppResult<User> {
        let email = normalize_email(&request.email);

        if self.repository.users.get_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists!".to_string()));
        }

        let password = self.credentials.hash_password(&request.password)?;
        let user = self.repository.users.create(&email, &password, Role::User).await?;

        tracing::info!("Registered user id={}", user.id);
        Ok(user)
    }

    /// Check credentials and issue an access token
    pub async fn login(&self, request: LoginRequest) -> AppResult<String> {
        let email = normalize_email(&request.email);

        let user = self
            .repository
            .users
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !self.credentials.verify_password(&request.password, &user.password)? {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        self.tokens.issue(user.id)
    }

    /// Issue a fresh token for an already authenticated user
    pub fn refresh(&self, user: &CurrentUser) -> AppResult<String> {
        self.tokens.issue(user.id)
    }

    /// Resolve a bearer token to the user it was issued for
    pub async fn authenticate(&self, token: &str) -> AppResult<CurrentUser> {
        let claims = self.tokens.verify(token)?;

        self.repository
            .users
            .get_by_id(claims.id)
            .await?
            .map(CurrentUser::from)
            .ok_or_else(AppError::unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    fn service(repository: Repository) -> AuthService {
        AuthService::new(
            repository,
            CredentialService::new(),
            TokenService::new(&AuthConfig::default()),
        )
    }

    fn registration(email: &str) -> RegisterUser {
        RegisterUser {
            email: email.to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let repository = Repository::in_memory();
        let auth = service(repository.clone());

        let user = auth.register(registration("Reader@Example.com")).await.unwrap();
        assert_eq!(user.email, "reader@example.com");
        assert_eq!(user.role, Role::User);

        let stored = repository.users.get_by_id(user.id).await.unwrap().unwrap();
        assert_ne!(stored.password, "password123");
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let auth = service(Repository::in_memory());
        auth.register(registration("reader@example.com")).await.unwrap();

        let err = auth
            .register(registration("reader@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == "Email already exists!"));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = service(Repository::in_memory());
        auth.register(registration("reader@example.com")).await.unwrap();

        let wrong_password = auth
            .login(login("reader@example.com", "password999"))
            .await
            .unwrap_err();
        let unknown_email = auth
            .login(login("ghost@example.com", "password123"))
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_login_token_authenticates() {
        let auth = service(Repository::in_memory());
        let user = auth.register(registration("reader@example.com")).await.unwrap();

        let token = auth.login(login("reader@example.com", "password123")).await.unwrap();
        let current = auth.authenticate(&token).await.unwrap();

        assert_eq!(current.id, user.id);
        assert_eq!(current.email, "reader@example.com");
        assert!(!current.is_admin());

        let refreshed = auth.refresh(&current).unwrap();
        assert_eq!(auth.authenticate(&refreshed).await.unwrap(), current);
    }

    #[tokio::test]
    async fn test_token_for_missing_user_is_unauthenticated() {
        let auth = service(Repository::in_memory());
        let token = TokenService::new(&AuthConfig::default()).issue(42).unwrap();

        let err = auth.authenticate(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(ref m) if m == "unauthenticated"));
    }
}
