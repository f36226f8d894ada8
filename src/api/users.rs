//! Endpoints for signed-in users: token refresh and borrowings

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::{AppError, AppResult},
    models::{
        borrowing::{BorrowRequest, Borrowing, ReturnRequest},
        user::AccessToken,
    },
    AppState,
};

use super::{AuthenticatedUser, BookIdPath, ValidatedJson};

/// Issue a fresh access token
#[utoipa::path(
    get,
    path = "/users/refresh-token",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "New access token", body = AccessToken),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<AccessToken>> {
    let access_token = state.services.auth.refresh(&user)?;
    Ok(Json(AccessToken { access_token }))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/users/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed", body = Borrowing),
        (status = 400, description = "Book is already borrowed", body = crate::error::ErrorResponse),
        (status = 403, description = "Borrowing for another user", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<BorrowRequest>,
) -> AppResult<(StatusCode, Json<Borrowing>)> {
    let borrowing = state
        .services
        .borrowings
        .borrow(&user, request.user_id, request.book_id)
        .await?;

    Ok((StatusCode::CREATED, Json(borrowing)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/users/borrowings/{bookId}/return",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("bookId" = i32, Path, description = "Book ID")
    ),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = Borrowing),
        (status = 400, description = "Book is not borrowed", body = crate::error::ErrorResponse),
        (status = 403, description = "Borrowed by another user", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    BookIdPath(book_id): BookIdPath,
    ValidatedJson(request): ValidatedJson<ReturnRequest>,
) -> AppResult<Json<Borrowing>> {
    if request.book_id.is_some_and(|id| id != book_id) {
        return Err(AppError::BadRequest("Book id mismatch".to_string()));
    }

    let borrowing = state
        .services
        .borrowings
        .return_book(&user, request.user_id, book_id)
        .await?;

    Ok(Json(borrowing))
}
