//! HTTP layer: request extractors, handlers and the router

pub mod admin;
pub mod auth;
pub mod health;
pub mod openapi;
pub mod rate_limit;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use validator::{Validate, ValidationErrors};

use crate::{
    error::AppError,
    models::{
        book::{CreateBook, UpdateBook},
        borrowing::{BorrowRequest, ReturnRequest},
        user::{CurrentUser, LoginRequest, RegisterUser},
    },
    AppState,
};

/// Extractor for the user behind a bearer token
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(AppError::unauthenticated)?;

        let user = state.services.auth.authenticate(token).await?;
        Ok(AuthenticatedUser(user))
    }
}

/// Extractor for an authenticated user holding the admin role
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            tracing::debug!("User {} denied admin access", user.id);
            return Err(AppError::Authorization(
                "You are not authorized to access this resource.".to_string(),
            ));
        }

        Ok(AdminUser(user))
    }
}

/// Numeric `:bookId` path segment
pub struct BookIdPath(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for BookIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        raw.parse::<i32>()
            .map(BookIdPath)
            .map_err(|_| AppError::BadRequest("Book id must be a number".to_string()))
    }
}

/// Order in which a request's fields are reported when several fail validation.
/// Fields not listed come after the listed ones, by name.
pub trait FieldOrder {
    const FIELDS: &'static [&'static str] = &[];
}

impl FieldOrder for RegisterUser {
    const FIELDS: &'static [&'static str] = &["email", "password", "confirm_password"];
}

impl FieldOrder for LoginRequest {
    const FIELDS: &'static [&'static str] = &["email", "password"];
}

impl FieldOrder for CreateBook {
    const FIELDS: &'static [&'static str] = &["title", "detail", "author", "category"];
}

impl FieldOrder for UpdateBook {
    const FIELDS: &'static [&'static str] = &["title", "detail", "author", "category"];
}

impl FieldOrder for BorrowRequest {}

impl FieldOrder for ReturnRequest {}

/// JSON body that has passed its `validator` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + FieldOrder,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| first_validation_message(errors, T::FIELDS))?;
        Ok(ValidatedJson(value))
    }
}

/// Message of the first failing field in `order`
fn first_validation_message(errors: ValidationErrors, order: &[&str]) -> AppError {
    let mut fields: Vec<(usize, String, String)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let field = field.to_string();
            let message = errors
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("{} is invalid", field));
            let rank = order
                .iter()
                .position(|name| *name == field)
                .unwrap_or(order.len());
            (rank, field, message)
        })
        .collect();
    fields.sort();

    let message = fields
        .into_iter()
        .next()
        .map(|(_, _, message)| message)
        .unwrap_or_else(|| "Invalid request".to_string());
    AppError::Validation(message)
}

/// Build the application router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let rate_limit = state.config.rate_limit.clone();

    let api = Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Public
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/books", get(auth::search_books))
        .route("/auth/books/most-borrowed", get(auth::most_borrowed))
        .route("/auth/books/:bookId", get(auth::get_book))
        // Signed-in users
        .route("/users/refresh-token", get(users::refresh_token))
        .route("/users/borrowings", post(users::borrow_book))
        .route("/users/borrowings/:bookId/return", post(users::return_book))
        // Admin
        .route("/admin/books", post(admin::create_book))
        .route(
            "/admin/books/:bookId",
            put(admin::update_book).delete(admin::delete_book),
        )
        .with_state(state);

    let router = rate_limit::apply(api, &rate_limit);

    router
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
