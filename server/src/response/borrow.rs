use crate::controller::Exhaust;
use crate::response::{BookBriefResponse, Envelope, Reply, UserBriefResponse};
use application::transfer::BorrowDto;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowResponse {
    id: Uuid,
    book_id: Uuid,
    user_id: Uuid,
    status: String,
    #[serde(with = "time::serde::rfc3339")]
    requested_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    issue_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    due_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    return_date: Option<OffsetDateTime>,
    approved_by: Option<Uuid>,
    fine: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    book: Option<BookBriefResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<UserBriefResponse>,
}

impl From<BorrowDto> for BorrowResponse {
    fn from(value: BorrowDto) -> Self {
        Self {
            id: value.id,
            book_id: value.book_id,
            user_id: value.user_id,
            status: value.status,
            requested_at: value.requested_at,
            issue_date: value.issued_at,
            due_date: value.due_at,
            return_date: value.returned_at,
            approved_by: value.approved_by,
            fine: value.fine,
            book: value.book.map(BookBriefResponse::from),
            user: value.user.map(UserBriefResponse::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BorrowPayload {
    borrow: BorrowResponse,
}

#[derive(Debug, Serialize)]
pub struct BorrowsPayload {
    borrows: Vec<BorrowResponse>,
}

pub struct BorrowPresenter(pub Reply);

impl Exhaust<BorrowDto> for BorrowPresenter {
    type To = Envelope<BorrowPayload>;
    fn emit(&self, input: BorrowDto) -> Self::To {
        self.0.wrap(BorrowPayload {
            borrow: input.into(),
        })
    }
}

impl Exhaust<Vec<BorrowDto>> for BorrowPresenter {
    type To = Envelope<BorrowsPayload>;
    fn emit(&self, input: Vec<BorrowDto>) -> Self::To {
        let borrows = input.into_iter().map(BorrowResponse::from).collect();
        self.0.wrap(BorrowsPayload { borrows })
    }
}
