//! Borrowing (loan ledger) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Borrowing model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrowing {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Borrowing {
    /// Still held by the borrower
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// Borrow request. Ids are not range checked: the caller's identity is checked first
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub user_id: i32,
    pub book_id: i32,
}

/// Return request; the book id in the path is authoritative
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub user_id: i32,
    pub book_id: Option<i32>,
}
