use crate::controller::Intake;
use application::transfer::{BorrowTransitionDto, RequestIssueDto};
use uuid::Uuid;

#[derive(Debug)]
pub struct RequestIssueRequest {
    book_id: Uuid,
}

impl RequestIssueRequest {
    pub fn new(book_id: Uuid) -> Self {
        Self { book_id }
    }
}

/// Any of the transitions that act on an existing record.
#[derive(Debug)]
pub struct BorrowTransitionRequest {
    id: Uuid,
}

impl BorrowTransitionRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

pub struct BorrowTransformer;

impl Intake<RequestIssueRequest> for BorrowTransformer {
    type To = RequestIssueDto;
    fn emit(&self, input: RequestIssueRequest) -> Self::To {
        RequestIssueDto {
            book_id: input.book_id,
        }
    }
}

impl Intake<BorrowTransitionRequest> for BorrowTransformer {
    type To = BorrowTransitionDto;
    fn emit(&self, input: BorrowTransitionRequest) -> Self::To {
        BorrowTransitionDto { id: input.id }
    }
}
