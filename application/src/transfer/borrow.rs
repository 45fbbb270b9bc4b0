use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::prelude::entity::{Borrow, DestructBorrow};

use crate::transfer::{BookBriefDto, UserBriefDto};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BorrowDto {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub requested_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub issued_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub due_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub returned_at: Option<OffsetDateTime>,
    pub approved_by: Option<Uuid>,
    pub fine: i64,
    pub book: Option<BookBriefDto>,
    pub user: Option<UserBriefDto>,
}

impl BorrowDto {
    /// `now` is the instant fines are assessed at for records still out.
    pub fn new(borrow: Borrow, now: OffsetDateTime) -> Self {
        let fine = borrow.fine(now).amount();
        let DestructBorrow {
            id,
            book_id,
            user_id,
            status,
            requested_at,
            issued_at,
            due_at,
            returned_at,
            approved_by,
        } = borrow.into_destruct();
        Self {
            id: id.into(),
            book_id: book_id.into(),
            user_id: user_id.into(),
            status: status.to_string(),
            requested_at: requested_at.into(),
            issued_at: issued_at.map(OffsetDateTime::from),
            due_at: due_at.into(),
            returned_at: returned_at.map(OffsetDateTime::from),
            approved_by: approved_by.map(Uuid::from),
            fine,
            book: None,
            user: None,
        }
    }

    pub fn with_book(mut self, book: Option<BookBriefDto>) -> Self {
        self.book = book;
        self
    }

    pub fn with_user(mut self, user: Option<UserBriefDto>) -> Self {
        self.user = user;
        self
    }
}

pub struct RequestIssueDto {
    pub book_id: Uuid,
}

/// Identifies the record an approval, return request or rejection applies to.
pub struct BorrowTransitionDto {
    pub id: Uuid,
}
