//! Catalog management endpoints (admin only)

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
    AppState,
};

use super::{AdminUser, BookIdPath, ValidatedJson};

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/admin/books",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ValidatedJson(book): ValidatedJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update some fields of a book
#[utoipa::path(
    put,
    path = "/admin/books/{bookId}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("bookId" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    BookIdPath(book_id): BookIdPath,
    ValidatedJson(patch): ValidatedJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.update_book(book_id, patch).await?;
    Ok(Json(book))
}

/// Delete a book that is not currently borrowed
#[utoipa::path(
    delete,
    path = "/admin/books/{bookId}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("bookId" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book is borrowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    BookIdPath(book_id): BookIdPath,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.delete_book(book_id).await?;
    tracing::debug!("Book {} deleted by admin {}", book_id, admin.id);

    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
