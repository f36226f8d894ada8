//! Public endpoints: account creation, login and catalog browsing

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, BookSummary, MostBorrowed},
        user::{AccessToken, LoginRequest, RegisterUser, RegisteredUser},
    },
    AppState,
};

use super::{BookIdPath, ValidatedJson};

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = RegisteredUser),
        (status = 400, description = "Invalid email or password", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterUser>,
) -> AppResult<(StatusCode, Json<RegisteredUser>)> {
    let user = state.services.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(RegisteredUser::from(user))))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AccessToken),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AccessToken>> {
    let access_token = state.services.auth.login(request).await?;
    Ok(Json(AccessToken { access_token }))
}

/// Search the catalog
#[utoipa::path(
    get,
    path = "/auth/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books with availability", body = Vec<BookSummary>),
        (status = 400, description = "No search criterion given", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let books = state.services.catalog.search_books(&query).await?;
    Ok(Json(books))
}

/// Get a single book
#[utoipa::path(
    get,
    path = "/auth/books/{bookId}",
    tag = "books",
    params(
        ("bookId" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Book id is not a number", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    BookIdPath(book_id): BookIdPath,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(book_id).await?;
    Ok(Json(book))
}

/// The most borrowed title
#[utoipa::path(
    get,
    path = "/auth/books/most-borrowed",
    tag = "books",
    responses(
        (status = 200, description = "Most borrowed title", body = MostBorrowed),
        (status = 404, description = "Nothing has been borrowed yet", body = crate::error::ErrorResponse)
    )
)]
pub async fn most_borrowed(State(state): State<AppState>) -> AppResult<Json<MostBorrowed>> {
    let summary = state.services.catalog.most_borrowed().await?;
    Ok(Json(summary))
}
