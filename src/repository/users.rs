//! Users repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{conflict_on_unique, AppResult},
    models::user::{Role, User, UserRow},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Get user by ID
    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Get user by (normalized) email
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a user; a taken email is a conflict
    async fn create(&self, email: &str, password_hash: &str, role: Role) -> AppResult<User>;
}

#[derive(Clone)]
pub struct PgUsersRepository {
    pool: Pool<Postgres>,
}

impl PgUsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.email, u.password, r.name AS role
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.email, u.password, r.name AS role
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn create(&self, email: &str, password_hash: &str, role: Role) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            WITH inserted AS (
                INSERT INTO users (email, password, role_id)
                SELECT $1, $2, r.id FROM roles r WHERE r.name = $3
                RETURNING id, email, password, role_id
            )
            SELECT i.id, i.email, i.password, r.name AS role
            FROM inserted i
            JOIN roles r ON r.id = i.role_id
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Email already exists!"))?;

        Ok(row.into())
    }
}
